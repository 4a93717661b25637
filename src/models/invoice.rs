use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub expected_payment_date: Option<NaiveDate>,
    pub paid: bool,
    pub paid_at: Option<NaiveDate>,
    pub seen_by_admin: bool,
    pub created_by: Option<Uuid>,
    pub created_by_email: Option<String>,
    pub image_name: Option<String>,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row written when a user submits a new invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub project_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub expected_payment_date: Option<NaiveDate>,
    pub created_by: Uuid,
    pub created_by_email: String,
    pub image_name: Option<String>,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update of an invoice. `None` leaves the column untouched;
/// `expected_payment_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceChanges {
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub expected_payment_date: Option<Option<NaiveDate>>,
}

impl InvoiceChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.date.is_none() && self.expected_payment_date.is_none()
    }
}
