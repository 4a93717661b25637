use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct PayrollEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: f64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayrollEntry {
    pub project_id: Uuid,
    pub amount: f64,
    pub created_by: Uuid,
}
