//! IoT hub HTTP client
//!
//! Provides a device-scoped HTTP client for the hub's file-upload endpoints.
//! Handles the `Authorization` header, the `api-version` query parameter and
//! per-device endpoint construction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hubfile_iothub::client::HubClient;
//!
//! let client = HubClient::new("my-hub.azure-devices.net", "device-01")
//!     .with_sas_token("SharedAccessSignature sr=...");
//! assert_eq!(client.device_id(), "device-01");
//! ```

use std::time::Duration;

use hubfile_core::config::{HubConfig, DEFAULT_API_VERSION};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::HubError;

/// Connect timeout applied to every hub and storage request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// HubClient
// ============================================================================

/// HTTP client for one device identity on one hub
///
/// Wraps `reqwest::Client` with the device SAS token, the REST API version and
/// URL construction for `/devices/{id}/files...` endpoints.
pub struct HubClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for hub requests (scheme and host)
    base_url: String,
    /// Device identity
    device_id: String,
    /// Value sent as the `api-version` query parameter
    api_version: String,
    /// Device SAS token sent as the `Authorization` header
    sas_token: Option<String>,
}

impl HubClient {
    /// Creates a client for `https://{host_name}`
    pub fn new(host_name: &str, device_id: impl Into<String>) -> Self {
        Self::with_base_url(format!("https://{host_name}"), device_id)
    }

    /// Creates a client with a custom base URL (useful for testing)
    pub fn with_base_url(base_url: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            device_id: device_id.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            sas_token: None,
        }
    }

    /// Creates a client from the `hub` configuration section
    pub fn from_config(config: &HubConfig) -> Self {
        let mut client = Self::new(&config.host_name, config.device_id.clone())
            .with_api_version(config.api_version.clone());
        client.sas_token = config.sas_token.clone();
        client
    }

    /// Sets the device SAS token
    pub fn with_sas_token(mut self, token: impl Into<String>) -> Self {
        self.sas_token = Some(token.into());
        self
    }

    /// Overrides the REST API version
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for `/devices/{device_id}/{segments...}`
    ///
    /// Every segment is percent-encoded on its own, so a device id containing
    /// `/` or `#` cannot escape its path segment.
    pub fn device_url(&self, segments: &[&str]) -> Result<Url, HubError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| HubError::InvalidResponse(format!("invalid hub base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| HubError::InvalidResponse("hub base URL cannot be a base".into()))?
            .pop_if_empty()
            .push("devices")
            .push(&self.device_id)
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    /// Creates an authenticated request for a device endpoint
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, HubError> {
        let url = self.device_url(segments)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.sas_token {
            builder = builder.header(reqwest::header::AUTHORIZATION, token);
        }
        Ok(builder)
    }

    /// POSTs a JSON body to a device endpoint and checks the status
    ///
    /// Returns the response on 2xx; other statuses are classified into
    /// [`HubError`] with the response body attached.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Response, HubError> {
        let response = self.request(Method::POST, segments)?.json(body).send().await?;
        check_status(response).await
    }
}

/// Returns the response unchanged on 2xx, a classified error otherwise
pub(crate) async fn check_status(response: Response) -> Result<Response, HubError> {
    let status = response.status();
    if status.is_success() {
        debug!(status = status.as_u16(), url = %response.url().path(), "Request succeeded");
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "Request failed");
    Err(HubError::from_status(status, &headers, body))
}

/// Builds the shared `reqwest` client used by every adapter
pub(crate) fn http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("hubfile/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}
