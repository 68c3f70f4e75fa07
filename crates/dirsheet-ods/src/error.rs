//! ODS error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for ODS operations
pub type OdsResult<T> = std::result::Result<T, OdsError>;

/// Errors that can occur while generating an ODS document
#[derive(Debug, Error)]
pub enum OdsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Core error (template missing, allocation failure, lifecycle misuse)
    #[error("Core error: {0}")]
    Core(#[from] dirsheet_core::Error),

    /// The archive does not contain the content entry
    #[error("Archive {} has no entry named {entry}", .archive.display())]
    ContentEntryMissing { archive: PathBuf, entry: String },

    /// The archive could not be opened or read
    #[error("Cannot open archive {}: {reason}", .path.display())]
    ArchiveOpen { path: PathBuf, reason: String },

    /// The archive could not be modified or finalized
    #[error("Cannot write archive {}: {reason}", .path.display())]
    ArchiveWrite { path: PathBuf, reason: String },

    /// An external archive tool failed
    #[error("Command `{program}` failed ({status}): {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },

    /// The template content lacks an expected node
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    /// A renderer invariant was violated
    #[error("Render failure: {0}")]
    Render(String),
}

impl OdsError {
    pub(crate) fn archive_open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        OdsError::ArchiveOpen {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn archive_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        OdsError::ArchiveWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
