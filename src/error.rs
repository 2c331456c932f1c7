//! Error types shared across the crate

use thiserror::Error;

/// Crate-wide result alias
pub type FdResult<T> = Result<T, FdError>;

#[derive(Debug, Error)]
pub enum FdError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Deposit not found: {0}")]
    NotFound(String),

    #[error("Duplicate deposit id: {0}")]
    DuplicateId(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Import error on line {line}: {reason}")]
    Import { line: u64, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FdError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FdError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FdError {
    fn from(e: serde_json::Error) -> Self {
        FdError::Serialization(e.to_string())
    }
}
