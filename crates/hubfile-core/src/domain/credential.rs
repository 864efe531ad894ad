//! Upload credential issued by the hub
//!
//! An [`UploadCredential`] is returned by the credential port during
//! REQUEST_BLOB and lives only until UPLOAD_FILE completes.

use chrono::{DateTime, Utc};
use url::Url;

use super::newtypes::{CorrelationId, SasToken};

/// Short-lived write authorization for one blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredential {
    /// Token that ties the later notify call back to this request
    correlation_id: CorrelationId,
    /// Destination blob URI, without the SAS query
    blob_uri: Url,
    /// Write token for the destination
    sas_token: SasToken,
    /// When the token stops being accepted by storage, if known
    expires_at: Option<DateTime<Utc>>,
}

impl UploadCredential {
    /// Creates a new credential without a known expiry
    pub fn new(correlation_id: CorrelationId, blob_uri: Url, sas_token: SasToken) -> Self {
        Self {
            correlation_id,
            blob_uri,
            sas_token,
            expires_at: None,
        }
    }

    /// Sets the expiry timestamp
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn blob_uri(&self) -> &Url {
        &self.blob_uri
    }

    pub fn sas_token(&self) -> &SasToken {
        &self.sas_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true if the credential has a known expiry that has passed
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the credential is expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}
