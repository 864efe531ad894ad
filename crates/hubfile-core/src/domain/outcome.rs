//! Upload results and outcomes
//!
//! [`UploadResult`] is what the blob uploader port reports back.
//! [`UploadOutcome`] is what NOTIFY_IOTHUB sends to the hub: the result
//! stamped with the correlation id of the credential it was produced under.

use serde::{Deserialize, Serialize};

use super::newtypes::CorrelationId;

/// Status code reported when the upload never produced a storage status
/// (source I/O error, transport failure, timeout, expired credential).
pub const STATUS_CLIENT_FAILURE: u16 = 500;

/// Raw result of one blob upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Storage status code (HTTP semantics: 2xx means the blob was written)
    pub status_code: u16,
    /// Human-readable status description
    pub status_description: String,
    /// Number of bytes sent, when the uploader tracks it
    pub bytes_sent: Option<u64>,
}

impl UploadResult {
    /// A successful result with the given status code
    pub fn success(status_code: u16, description: impl Into<String>) -> Self {
        Self {
            status_code,
            status_description: description.into(),
            bytes_sent: None,
        }
    }

    /// A failed result with the given status code
    pub fn failure(status_code: u16, description: impl Into<String>) -> Self {
        Self {
            status_code,
            status_description: description.into(),
            bytes_sent: None,
        }
    }

    /// Records the number of bytes sent
    pub fn with_bytes_sent(mut self, bytes: u64) -> Self {
        self.bytes_sent = Some(bytes);
        self
    }

    /// Returns true if the storage backend accepted the write
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Outcome of UPLOAD_FILE, reported to the hub by NOTIFY_IOTHUB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    correlation_id: CorrelationId,
    success: bool,
    status_code: u16,
    status_description: String,
}

impl UploadOutcome {
    /// Builds the outcome from an uploader result
    pub fn from_result(correlation_id: CorrelationId, result: &UploadResult) -> Self {
        Self {
            correlation_id,
            success: result.is_success(),
            status_code: result.status_code,
            status_description: result.status_description.clone(),
        }
    }

    /// Builds a failed outcome for an upload that produced no storage status
    pub fn client_failure(correlation_id: CorrelationId, description: impl Into<String>) -> Self {
        Self {
            correlation_id,
            success: false,
            status_code: STATUS_CLIENT_FAILURE,
            status_description: description.into(),
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_description(&self) -> &str {
        &self.status_description
    }
}
