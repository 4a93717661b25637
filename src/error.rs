use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// The signed-in user may not perform the named action
    #[error("Not allowed to {0}")]
    Forbidden(&'static str),

    #[error("This project is inactive. Ask an admin to reactivate it.")]
    InactiveProject,

    #[error("Amount must be a non-negative number")]
    InvalidAmount,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
