//! Notify client port (driven/secondary port)
//!
//! Reports the upload outcome to the hub so it can release the credential
//! and fan the notification out to subscribers. This is the only
//! collaborator invoked during NOTIFY_IOTHUB.

use crate::domain::{CorrelationId, UploadOutcome};

/// Port trait for the NOTIFY_IOTHUB phase
#[async_trait::async_trait]
pub trait INotifyClient: Send + Sync {
    /// Sends `outcome` for the credential identified by `correlation_id`
    async fn notify(
        &self,
        correlation_id: &CorrelationId,
        outcome: &UploadOutcome,
    ) -> anyhow::Result<()>;
}
