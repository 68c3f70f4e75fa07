//! Error types for dirsheet-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dirsheet-core
#[derive(Debug, Error)]
pub enum Error {
    /// Column index out of bounds
    #[error("Column index {0} out of bounds (count: {1})")]
    ColumnOutOfBounds(usize, usize),

    /// An empty string was written where a value is required
    #[error("Empty value for column {0}; use a no-value insertion to leave a cell blank")]
    EmptyValue(usize),

    /// A multivalue insertion received no values
    #[error("Empty value sequence for column {0}")]
    EmptySequence(usize),

    /// The configured template does not exist
    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    /// Row or cell storage could not be allocated
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// Operation not allowed in the current lifecycle state
    #[error("Invalid document state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
