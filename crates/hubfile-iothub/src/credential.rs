//! REQUEST_BLOB adapter
//!
//! Asks the hub for a SAS URI to write one blob (`POST /devices/{id}/files`)
//! and turns the reply into an [`UploadCredential`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hubfile_core::domain::{BlobName, CorrelationId, SasToken, UploadCredential};
use hubfile_core::ports::credential_client::ICredentialClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::client::HubClient;
use crate::HubError;

// ============================================================================
// Wire types
// ============================================================================

/// Body of the SAS URI request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileUploadSasUriRequest<'a> {
    blob_name: &'a str,
}

/// Reply to the SAS URI request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadSasUriResponse {
    /// Ties the later completion notification to this request
    pub correlation_id: String,
    /// Storage account host, e.g. `account.blob.core.windows.net`
    pub host_name: String,
    /// Storage container
    pub container_name: String,
    /// Blob name as assigned by the hub, usually `{device_id}/{requested name}`
    pub blob_name: String,
    /// SAS query string granting write access to the blob
    pub sas_token: String,
    /// Expiry of the SAS token, when the hub reports it
    #[serde(default)]
    pub expiry_time: Option<DateTime<Utc>>,
}

impl FileUploadSasUriResponse {
    /// Validates the reply and converts it into a domain credential
    pub fn into_credential(self) -> Result<UploadCredential, HubError> {
        let correlation_id = CorrelationId::new(self.correlation_id)
            .map_err(|e| HubError::InvalidResponse(e.to_string()))?;
        let sas_token =
            SasToken::new(self.sas_token).map_err(|e| HubError::InvalidResponse(e.to_string()))?;
        let blob_uri = build_blob_uri(&self.host_name, &self.container_name, &self.blob_name)?;

        let credential = UploadCredential::new(correlation_id, blob_uri, sas_token);
        Ok(match self.expiry_time {
            Some(expires_at) => credential.with_expiry(expires_at),
            None => credential,
        })
    }
}

/// Builds `https://{host}/{container}/{blob}` with every path segment encoded
///
/// A `host_name` that already carries a scheme (`http://127.0.0.1:10000`) is
/// used as given, which is how storage emulators are addressed.
pub fn build_blob_uri(
    host_name: &str,
    container_name: &str,
    blob_name: &str,
) -> Result<Url, HubError> {
    if host_name.trim().is_empty() {
        return Err(HubError::InvalidResponse("hostName is empty".into()));
    }
    if container_name.is_empty() || blob_name.is_empty() {
        return Err(HubError::InvalidResponse(
            "containerName and blobName must not be empty".into(),
        ));
    }

    let base = if host_name.contains("://") {
        host_name.to_string()
    } else {
        format!("https://{host_name}")
    };
    let mut uri = Url::parse(&base)
        .map_err(|e| HubError::InvalidResponse(format!("invalid hostName {host_name:?}: {e}")))?;

    uri.path_segments_mut()
        .map_err(|()| HubError::InvalidResponse(format!("invalid hostName {host_name:?}")))?
        .pop_if_empty()
        .push(container_name)
        .extend(blob_name.split('/'));
    Ok(uri)
}

// ============================================================================
// HubCredentialClient
// ============================================================================

/// [`ICredentialClient`] backed by the hub's file-upload endpoint
pub struct HubCredentialClient {
    client: Arc<HubClient>,
}

impl HubCredentialClient {
    pub fn new(client: Arc<HubClient>) -> Self {
        Self { client }
    }

    /// Performs the request and returns the raw hub reply
    pub async fn request_sas_uri(
        &self,
        blob_name: &BlobName,
    ) -> Result<FileUploadSasUriResponse, HubError> {
        let body = FileUploadSasUriRequest {
            blob_name: blob_name.as_str(),
        };
        let response = self.client.post_json(&["files"], &body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| HubError::InvalidResponse(format!("SAS URI reply: {e}")))
    }
}

#[async_trait::async_trait]
impl ICredentialClient for HubCredentialClient {
    async fn request_credential(&self, blob_name: &BlobName) -> anyhow::Result<UploadCredential> {
        debug!(device_id = %self.client.device_id(), blob_name = %blob_name, "Requesting SAS URI");

        let reply = self.request_sas_uri(blob_name).await?;
        let credential = reply.into_credential()?;

        info!(
            correlation_id = %credential.correlation_id(),
            blob_uri = %credential.blob_uri(),
            "Upload credential issued"
        );
        Ok(credential)
    }
}
