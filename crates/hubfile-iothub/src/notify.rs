//! NOTIFY_IOTHUB adapter
//!
//! Reports the upload outcome to the hub
//! (`POST /devices/{id}/files/notifications`) so it can release the
//! correlation id and fan the notification out to back-end subscribers.

use std::sync::Arc;

use hubfile_core::domain::{CorrelationId, UploadOutcome};
use hubfile_core::ports::notify_client::INotifyClient;
use serde::Serialize;
use tracing::{debug, info};

use crate::client::HubClient;
use crate::HubError;

/// Body of the file upload completion notification
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadCompletionNotification<'a> {
    pub correlation_id: &'a str,
    pub is_success: bool,
    pub status_code: u16,
    pub status_description: &'a str,
}

impl<'a> FileUploadCompletionNotification<'a> {
    pub fn new(correlation_id: &'a CorrelationId, outcome: &'a UploadOutcome) -> Self {
        Self {
            correlation_id: correlation_id.as_str(),
            is_success: outcome.is_success(),
            status_code: outcome.status_code(),
            status_description: outcome.status_description(),
        }
    }
}

/// [`INotifyClient`] backed by the hub's notification endpoint
pub struct HubNotifyClient {
    client: Arc<HubClient>,
}

impl HubNotifyClient {
    pub fn new(client: Arc<HubClient>) -> Self {
        Self { client }
    }

    /// Sends the notification and checks the hub's reply
    pub async fn send(
        &self,
        correlation_id: &CorrelationId,
        outcome: &UploadOutcome,
    ) -> Result<(), HubError> {
        let body = FileUploadCompletionNotification::new(correlation_id, outcome);
        self.client
            .post_json(&["files", "notifications"], &body)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl INotifyClient for HubNotifyClient {
    async fn notify(
        &self,
        correlation_id: &CorrelationId,
        outcome: &UploadOutcome,
    ) -> anyhow::Result<()> {
        debug!(
            correlation_id = %correlation_id,
            success = outcome.is_success(),
            status_code = outcome.status_code(),
            "Sending upload notification"
        );

        self.send(correlation_id, outcome).await?;

        info!(correlation_id = %correlation_id, "Hub acknowledged upload notification");
        Ok(())
    }
}
