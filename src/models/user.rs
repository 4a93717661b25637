use uuid::Uuid;

/// Identity returned by the auth backend after a successful sign-in.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Regular,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Regular => "User",
        }
    }
}

/// The signed-in user as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
