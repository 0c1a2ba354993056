//! Common error types for the user management services

use thiserror::Error;

/// Common result type for user management operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole operation
///
/// Per-record validation failures are not represented here; they are
/// collected as field errors by the validation core and never thrown.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Repository or storage backend failure outside of sqlx
    #[error("Repository error: {0}")]
    Repository(String),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// A bounded call did not complete in time
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

impl Error {
    /// True for errors produced by cancellation or deadline expiry
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded(_))
    }
}
