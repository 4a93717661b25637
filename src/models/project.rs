use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub created_by: Option<Uuid>,
    pub created_by_email: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Projects without an explicit flag count as active.
    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    pub fn owner_email(&self) -> &str {
        self.created_by_email.as_deref().unwrap_or("admin")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub created_by: Uuid,
    pub created_by_email: String,
}
