use chrono::NaiveDate;
use uuid::Uuid;

use super::folders::{Folder, InvoiceView, ScopedInvoice};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl StatusFilter {
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Paid,
            StatusFilter::Paid => StatusFilter::Unpaid,
            StatusFilter::Unpaid => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Paid => "Paid",
            StatusFilter::Unpaid => "Unpaid",
        }
    }
}

/// Dashboard and project-list filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    pub status: StatusFilter,
    pub project: Option<Uuid>,
    pub created_on: Option<NaiveDate>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub paid_on: Option<NaiveDate>,
}

impl InvoiceFilter {
    pub fn is_empty(&self) -> bool {
        *self == InvoiceFilter::default()
    }

    /// Filters that narrow a folder down to folders holding a matching invoice.
    /// The created-date range only applies to invoice lists.
    fn narrows_folders(&self) -> bool {
        self.status != StatusFilter::All || self.created_on.is_some() || self.paid_on.is_some()
    }

    pub fn matches_invoice(&self, invoice: &InvoiceView) -> bool {
        match self.status {
            StatusFilter::Paid if !invoice.paid => return false,
            StatusFilter::Unpaid if invoice.paid => return false,
            _ => {}
        }
        if self.created_on.is_some_and(|day| invoice.created_on != day) {
            return false;
        }
        if self.created_from.is_some_and(|from| invoice.created_on < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| invoice.created_on > to) {
            return false;
        }
        if self.paid_on.is_some() && invoice.paid_at != self.paid_on {
            return false;
        }
        true
    }

    pub fn matches_folder(&self, folder: &Folder) -> bool {
        if self.project.is_some_and(|id| folder.id != id) {
            return false;
        }
        if !self.narrows_folders() {
            return true;
        }
        folder.invoices.iter().any(|invoice| self.matches_invoice(invoice))
    }

    pub fn apply(&self, invoices: &[ScopedInvoice]) -> Vec<ScopedInvoice> {
        invoices
            .iter()
            .filter(|s| self.project.map_or(true, |id| s.folder_id == id))
            .filter(|s| self.matches_invoice(&s.invoice))
            .cloned()
            .collect()
    }

    pub fn folders<'a>(&self, folders: &'a [Folder]) -> Vec<&'a Folder> {
        folders.iter().filter(|f| self.matches_folder(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::folders::fixtures::view;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn dated(amount: f64, paid: bool, created: u32) -> InvoiceView {
        let mut invoice = view(amount, paid);
        invoice.created_on = day(created);
        if paid {
            invoice.paid_at = Some(day(created + 1));
        }
        invoice
    }

    fn folder(invoices: Vec<InvoiceView>) -> Folder {
        Folder {
            id: Uuid::new_v4(),
            name: "F".to_string(),
            owner_email: "admin".to_string(),
            is_active: true,
            invoices,
            payroll: Vec::new(),
        }
    }

    #[test]
    fn status_and_dates_narrow_invoices() {
        let paid = dated(10.0, true, 3);
        let open = dated(20.0, false, 7);

        let mut filter = InvoiceFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches_invoice(&paid) && filter.matches_invoice(&open));

        filter.status = StatusFilter::Unpaid;
        assert!(!filter.matches_invoice(&paid));
        assert!(filter.matches_invoice(&open));

        let filter = InvoiceFilter { created_on: Some(day(3)), ..Default::default() };
        assert!(filter.matches_invoice(&paid));
        assert!(!filter.matches_invoice(&open));

        let filter = InvoiceFilter { paid_on: Some(day(4)), ..Default::default() };
        assert!(filter.matches_invoice(&paid));
        assert!(!filter.matches_invoice(&open));
    }

    #[test]
    fn created_range_is_inclusive() {
        let filter = InvoiceFilter {
            created_from: Some(day(3)),
            created_to: Some(day(7)),
            ..Default::default()
        };
        assert!(filter.matches_invoice(&dated(1.0, false, 3)));
        assert!(filter.matches_invoice(&dated(1.0, false, 7)));
        assert!(!filter.matches_invoice(&dated(1.0, false, 2)));
        assert!(!filter.matches_invoice(&dated(1.0, false, 8)));
    }

    #[test]
    fn folders_need_a_matching_invoice_only_when_narrowed() {
        let empty = folder(vec![]);
        let paid_only = folder(vec![dated(5.0, true, 1)]);

        let all = InvoiceFilter::default();
        assert!(all.matches_folder(&empty));

        let unpaid = InvoiceFilter { status: StatusFilter::Unpaid, ..Default::default() };
        assert!(!unpaid.matches_folder(&empty));
        assert!(!unpaid.matches_folder(&paid_only));

        let range = InvoiceFilter { created_from: Some(day(20)), ..Default::default() };
        assert!(range.matches_folder(&paid_only));

        let pinned = InvoiceFilter { project: Some(paid_only.id), ..Default::default() };
        let folders = [empty, paid_only.clone()];
        let kept = pinned.folders(&folders);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, paid_only.id);
    }

    #[test]
    fn apply_respects_project_and_invoice_filters() {
        let a = folder(vec![dated(1.0, true, 1), dated(2.0, false, 1)]);
        let b = folder(vec![dated(3.0, false, 1)]);
        let scoped: Vec<ScopedInvoice> = [&a, &b]
            .iter()
            .flat_map(|f| {
                f.invoices.iter().map(move |invoice| ScopedInvoice {
                    folder_id: f.id,
                    folder_name: f.name.clone(),
                    owner_email: f.owner_email.clone(),
                    invoice: invoice.clone(),
                })
            })
            .collect();

        let filter = InvoiceFilter {
            status: StatusFilter::Unpaid,
            project: Some(a.id),
            ..Default::default()
        };
        let kept = filter.apply(&scoped);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].invoice.amount, 2.0);
    }

    #[test]
    fn status_cycles() {
        assert_eq!(StatusFilter::All.next().next().next(), StatusFilter::All);
    }
}
