use super::folders::InvoiceView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    NoInvoices,
    Unpaid,
    Paid,
}

impl FolderStatus {
    /// Empty collections have no status; a single unpaid invoice makes the
    /// whole collection unpaid.
    pub fn of(invoices: &[InvoiceView]) -> Self {
        if invoices.is_empty() {
            FolderStatus::NoInvoices
        } else if invoices.iter().any(|invoice| !invoice.paid) {
            FolderStatus::Unpaid
        } else {
            FolderStatus::Paid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FolderStatus::NoInvoices => "No invoices",
            FolderStatus::Unpaid => "Unpaid",
            FolderStatus::Paid => "Paid",
        }
    }
}

pub fn invoice_label(invoice: &InvoiceView) -> &'static str {
    if invoice.paid { "Paid" } else { "Unpaid" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::folders::fixtures::view;

    #[test]
    fn labels_follow_paid_state() {
        assert_eq!(FolderStatus::of(&[]).label(), "No invoices");
        assert_eq!(FolderStatus::of(&[view(10.0, true), view(5.0, false)]), FolderStatus::Unpaid);
        assert_eq!(FolderStatus::of(&[view(10.0, true), view(0.0, true)]), FolderStatus::Paid);
        assert_eq!(invoice_label(&view(1.0, false)), "Unpaid");
    }
}
