//! Common error types for the hazard services

use thiserror::Error;

/// Common result type for hazard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the hazard library and the admin server
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bootstrap configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A lookup by identifier or mnemonic matched no record
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Submitted form data could not be interpreted
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
