//! Blob uploader port (driven/secondary port)
//!
//! Sends file bytes to the storage backend using a credential issued by the
//! hub. This is the only collaborator invoked during UPLOAD_FILE.

use tokio::io::AsyncRead;
use url::Url;

use crate::domain::{SasToken, UploadResult};

/// Readable byte source for one upload
///
/// Owned by exactly one session. It is moved into [`IBlobUploader::upload`],
/// so it is dropped (and any underlying file handle closed) when that call
/// returns or its future is dropped.
pub type ByteSource = Box<dyn AsyncRead + Send + Unpin>;

/// Port trait for the UPLOAD_FILE phase
///
/// ## Implementation Notes
///
/// - Return `Ok` with a non-2xx [`UploadResult`] when storage answered but
///   rejected the write; return `Err` when no storage status was obtained
///   (source I/O error, transport failure).
/// - Chunking or parallel block upload is an adapter concern and invisible
///   to the use case.
#[async_trait::async_trait]
pub trait IBlobUploader: Send + Sync {
    /// Uploads the whole of `source` to `blob_uri` authorized by `sas_token`
    ///
    /// # Returns
    /// The storage status of the write
    async fn upload(
        &self,
        blob_uri: &Url,
        sas_token: &SasToken,
        source: ByteSource,
    ) -> anyhow::Result<UploadResult>;
}
