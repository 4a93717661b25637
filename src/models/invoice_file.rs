use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct InvoiceFile {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_url: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoiceFile {
    pub invoice_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_url: String,
    pub created_by: Uuid,
}
