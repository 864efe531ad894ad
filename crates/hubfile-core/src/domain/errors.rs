//! Domain error types
//!
//! [`DomainError`] covers validation failures and invalid state transitions
//! inside the domain model. [`UploadError`] is the taxonomy surfaced by the
//! upload orchestration: argument errors are returned synchronously, the
//! phase errors travel through the completion report.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Blob name is empty or malformed
    #[error("Invalid blob name: {0}")]
    InvalidBlobName(String),

    /// Correlation id returned by the hub is unusable
    #[error("Invalid correlation id: {0}")]
    InvalidCorrelationId(String),

    /// SAS token is empty or malformed
    #[error("Invalid SAS token: {0}")]
    InvalidSasToken(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current phase
        from: String,
        /// The attempted target phase
        to: String,
    },

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}

/// Errors produced by the upload-to-blob flow
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Malformed call (empty blob name, missing source, empty path)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The file-path entry point could not open the file
    #[error("File not found: {path}: {reason}")]
    FileNotFound {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },

    /// REQUEST_BLOB failed (hub rejection, timeout, transport error)
    #[error("credential request failed: {0}")]
    Credential(String),

    /// UPLOAD_FILE failed (source I/O, storage rejection, transport error)
    #[error("upload failed: {0}")]
    Upload(String),

    /// NOTIFY_IOTHUB failed; never changes the upload's own success flag
    #[error("notify failed: {0}")]
    Notify(String),
}

impl UploadError {
    /// Returns true for errors reported synchronously by the entry points
    pub fn is_synchronous(&self) -> bool {
        matches!(
            self,
            UploadError::InvalidArgument(_) | UploadError::FileNotFound { .. }
        )
    }
}

impl From<DomainError> for UploadError {
    fn from(err: DomainError) -> Self {
        UploadError::InvalidArgument(err.to_string())
    }
}
