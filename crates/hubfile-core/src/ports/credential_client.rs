//! Credential client port (driven/secondary port)
//!
//! Requests a short-lived write credential for a blob from the hub control
//! plane. This is the only collaborator invoked during REQUEST_BLOB.

use crate::domain::{BlobName, UploadCredential};

/// Port trait for the REQUEST_BLOB phase
///
/// ## Implementation Notes
///
/// - Each call must produce a credential with a correlation id unique to
///   that request; the use case relies on it to tie the notify call back.
/// - Implementations may suspend for as long as the transport needs. The
///   use case bounds the call with its own timeout and maps an elapsed
///   timeout to the same failure path as any other error.
#[async_trait::async_trait]
pub trait ICredentialClient: Send + Sync {
    /// Requests a write credential for `blob_name`
    ///
    /// # Returns
    /// The credential (correlation id, blob URI, SAS token, optional expiry)
    async fn request_credential(&self, blob_name: &BlobName) -> anyhow::Result<UploadCredential>;
}
