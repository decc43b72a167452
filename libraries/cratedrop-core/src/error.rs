/// Core error types for CrateDrop
use thiserror::Error;

/// Result type alias using `CrateError`
pub type Result<T> = std::result::Result<T, CrateError>;

/// Core error type for CrateDrop
#[derive(Error, Debug)]
pub enum CrateError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database errors (for catalog implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl CrateError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CrateError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
