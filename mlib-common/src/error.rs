//! Common error types for the music library

use thiserror::Error;

use crate::validation::FieldError;

/// Common result type for persistence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the persistence layer
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error, e.g. creating the store's parent directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more track fields violate their constraints
    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<FieldError>),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
