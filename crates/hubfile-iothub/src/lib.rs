//! hubfile IoT hub adapters
//!
//! Provides async HTTP adapters for the three upload ports:
//! - [`credential::HubCredentialClient`] - `POST /devices/{id}/files` (REQUEST_BLOB)
//! - [`storage::HttpBlobUploader`] - `PUT` to the SAS blob URI (UPLOAD_FILE)
//! - [`notify::HubNotifyClient`] - `POST /devices/{id}/files/notifications` (NOTIFY_IOTHUB)
//!
//! ## Modules
//!
//! - [`client`] - Authenticated hub HTTP client
//! - [`credential`] - SAS URI request and blob URI construction
//! - [`notify`] - File upload completion notification
//! - [`storage`] - Block blob upload

pub mod client;
pub mod credential;
pub mod notify;
pub mod storage;

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

/// Default wait suggested to callers when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the hub or to blob storage
#[derive(Debug, Error)]
pub enum HubError {
    /// Device credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The device or SAS token is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Device, container or correlation id unknown to the service
    #[error("Not found: {0}")]
    NotFound(String),

    /// Throttled; the service asked to wait before trying again
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {body}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Any other non-success status
    #[error("Request rejected ({status}): {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reading the upload source failed
    #[error("Source read error: {0}")]
    Io(#[from] std::io::Error),

    /// The upload source exceeded the single-request size limit
    #[error("Upload source exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: u64,
    },
}

impl HubError {
    /// Classifies a non-success response
    pub fn from_status(status: StatusCode, headers: &HeaderMap, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => HubError::Unauthorized(body),
            StatusCode::FORBIDDEN => HubError::Forbidden(body),
            StatusCode::NOT_FOUND => HubError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = headers
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                HubError::TooManyRequests { retry_after }
            }
            s if s.is_server_error() => HubError::ServerError {
                status: s.as_u16(),
                body,
            },
            s => HubError::Rejected {
                status: s.as_u16(),
                body,
            },
        }
    }
}

/// Parses a `Retry-After` header value (delay-seconds or HTTP-date)
///
/// HTTP-dates further than one hour away, in the past, or unparseable values
/// fall back to `default`.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let diff = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        if let Some(secs) = diff
            .num_seconds()
            .try_into()
            .ok()
            .filter(|&s: &u64| s > 0 && s <= 3600)
        {
            return Duration::from_secs(secs);
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}
