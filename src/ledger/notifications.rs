use chrono::NaiveDate;

use super::folders::ScopedInvoice;

/// Admin inbox: invoices nobody has looked at yet and invoices expected today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notifications {
    pub unseen: Vec<ScopedInvoice>,
    pub due_today: Vec<ScopedInvoice>,
}

impl Notifications {
    pub fn collect(invoices: &[ScopedInvoice], today: NaiveDate) -> Self {
        Self {
            unseen: invoices
                .iter()
                .filter(|s| !s.invoice.seen_by_admin)
                .cloned()
                .collect(),
            due_today: invoices
                .iter()
                .filter(|s| s.invoice.expected_payment_date == Some(today))
                .cloned()
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.unseen.len() + self.due_today.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::folders::fixtures::view;
    use uuid::Uuid;

    fn scoped(seen: bool, expected: Option<NaiveDate>) -> ScopedInvoice {
        let mut invoice = view(10.0, false);
        invoice.seen_by_admin = seen;
        invoice.expected_payment_date = expected;
        ScopedInvoice {
            folder_id: Uuid::new_v4(),
            folder_name: "F".to_string(),
            owner_email: "admin".to_string(),
            invoice,
        }
    }

    #[test]
    fn splits_unseen_and_due_today() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let invoices = vec![
            scoped(false, None),
            scoped(true, Some(today)),
            scoped(false, Some(today)),
            scoped(true, Some(tomorrow)),
        ];

        let inbox = Notifications::collect(&invoices, today);
        assert_eq!(inbox.unseen.len(), 2);
        assert_eq!(inbox.due_today.len(), 2);
        assert_eq!(inbox.count(), 4);
    }
}
