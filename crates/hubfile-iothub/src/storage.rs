//! UPLOAD_FILE adapter
//!
//! Writes the whole byte source as a block blob with a single
//! `PUT {blob_uri}?{sas}` request.

use hubfile_core::domain::{SasToken, UploadResult};
use hubfile_core::ports::blob_uploader::{ByteSource, IBlobUploader};
use reqwest::Client;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::http_client;
use crate::HubError;

/// Largest source accepted for a single-request block blob upload (256 MiB)
pub const DEFAULT_MAX_BLOB_SIZE: u64 = 256 * 1024 * 1024;

/// Longest storage error body kept in the status description
const MAX_DESCRIPTION_LEN: usize = 1024;

/// [`IBlobUploader`] that performs a single Put Blob request
pub struct HttpBlobUploader {
    client: Client,
    max_blob_size: u64,
}

impl Default for HttpBlobUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpBlobUploader {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }

    /// Overrides the maximum accepted source size
    pub fn with_max_blob_size(mut self, bytes: u64) -> Self {
        self.max_blob_size = bytes;
        self
    }

    /// Reads the source to the end, failing if it exceeds the size limit
    async fn read_source(&self, source: ByteSource) -> Result<Vec<u8>, HubError> {
        let mut data = Vec::new();
        // One extra byte tells "exactly at the limit" from "over it"
        source
            .take(self.max_blob_size.saturating_add(1))
            .read_to_end(&mut data)
            .await?;
        if data.len() as u64 > self.max_blob_size {
            return Err(HubError::PayloadTooLarge {
                limit: self.max_blob_size,
            });
        }
        Ok(data)
    }

    /// Sends the bytes and maps the storage reply into an [`UploadResult`]
    pub async fn put_blob(
        &self,
        blob_uri: &Url,
        sas_token: &SasToken,
        data: Vec<u8>,
    ) -> Result<UploadResult, HubError> {
        let url = signed_url(blob_uri, sas_token)?;
        let len = data.len() as u64;

        let response = self
            .client
            .put(url)
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let reason = status.canonical_reason().unwrap_or("OK");
            info!(blob_uri = %blob_uri, status = status.as_u16(), bytes = len, "Blob written");
            return Ok(UploadResult::success(status.as_u16(), reason).with_bytes_sent(len));
        }

        let body = response.text().await.unwrap_or_default();
        let description = describe_failure(status.canonical_reason(), &body);
        warn!(blob_uri = %blob_uri, status = status.as_u16(), description = %description, "Storage rejected blob");
        Ok(UploadResult::failure(status.as_u16(), description))
    }
}

#[async_trait::async_trait]
impl IBlobUploader for HttpBlobUploader {
    async fn upload(
        &self,
        blob_uri: &Url,
        sas_token: &SasToken,
        source: ByteSource,
    ) -> anyhow::Result<UploadResult> {
        let data = self.read_source(source).await?;
        debug!(blob_uri = %blob_uri, bytes = data.len(), "Uploading blob");
        Ok(self.put_blob(blob_uri, sas_token, data).await?)
    }
}

/// Appends the SAS query to the blob URI
fn signed_url(blob_uri: &Url, sas_token: &SasToken) -> Result<Url, HubError> {
    let mut url = blob_uri.clone();
    url.set_query(None);
    let signed = format!("{}{}", url.as_str(), sas_token.as_query());
    Url::parse(&signed).map_err(|e| HubError::InvalidResponse(format!("invalid SAS URI: {e}")))
}

/// Builds the status description for a rejected write
fn describe_failure(reason: Option<&str>, body: &str) -> String {
    let body = body.trim();
    let mut description = match (reason, body.is_empty()) {
        (Some(reason), true) => reason.to_string(),
        (Some(reason), false) => format!("{reason}: {body}"),
        (None, true) => "storage rejected the upload".to_string(),
        (None, false) => body.to_string(),
    };
    if description.len() > MAX_DESCRIPTION_LEN {
        let mut cut = MAX_DESCRIPTION_LEN;
        while !description.is_char_boundary(cut) {
            cut -= 1;
        }
        description.truncate(cut);
    }
    description
}
