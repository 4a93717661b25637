use chrono::NaiveDate;

use super::folders::InvoiceView;

/// Paid/unpaid/overdue sums over a set of invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub paid: f64,
    pub unpaid: f64,
    pub overdue: f64,
    pub paid_count: usize,
    pub unpaid_count: usize,
}

impl Totals {
    /// An invoice is overdue when it is unpaid and its expected payment date
    /// is strictly before `today`.
    pub fn compute<'a, I>(invoices: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a InvoiceView>,
    {
        let mut totals = Totals::default();
        for invoice in invoices {
            if invoice.paid {
                totals.paid += invoice.amount;
                totals.paid_count += 1;
            } else {
                totals.unpaid += invoice.amount;
                totals.unpaid_count += 1;
                if invoice.expected_payment_date.is_some_and(|due| due < today) {
                    totals.overdue += invoice.amount;
                }
            }
        }
        totals
    }

    pub fn total(&self) -> f64 {
        self.paid + self.unpaid
    }

    pub fn count(&self) -> usize {
        self.paid_count + self.unpaid_count
    }

    /// Percentage of the grand total, zero when there is nothing to divide.
    pub fn share(&self, part: f64) -> f64 {
        let total = self.total();
        if total == 0.0 { 0.0 } else { part / total * 100.0 }
    }
}
