//! Upload-to-blob use case
//!
//! Drives one [`UploadSession`] per call through the three protocol phases:
//!
//! 1. REQUEST_BLOB - ask the hub for a write credential
//! 2. UPLOAD_FILE - send the bytes to storage with that credential
//! 3. NOTIFY_IOTHUB - tell the hub how the upload went
//!
//! The entry points validate their arguments synchronously, schedule the
//! session on the tokio runtime and return immediately. The completion
//! callback is invoked exactly once per scheduled session, from a runtime
//! worker, and the same report is mirrored to the returned [`UploadTicket`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::domain::{
    BlobName, DomainError, SessionId, UploadCredential, UploadError, UploadOutcome, UploadReport,
    UploadSession,
};
use crate::ports::{ByteSource, IBlobUploader, ICredentialClient, INotifyClient};

/// Upper bounds for each collaborator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTimeouts {
    pub credential: Duration,
    pub upload: Duration,
    pub notify: Duration,
}

impl Default for UploadTimeouts {
    fn default() -> Self {
        Self {
            credential: Duration::from_secs(30),
            upload: Duration::from_secs(300),
            notify: Duration::from_secs(30),
        }
    }
}

/// Handle to a scheduled upload session
///
/// Dropping the ticket does not cancel the session; the completion
/// callback still fires.
#[derive(Debug)]
pub struct UploadTicket {
    session_id: SessionId,
    blob_name: BlobName,
    report: oneshot::Receiver<UploadReport>,
}

impl UploadTicket {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn blob_name(&self) -> &BlobName {
        &self.blob_name
    }

    /// Waits for the session to reach DONE or FAILED
    ///
    /// Returns `None` only if the session task was torn down before
    /// finishing (e.g. the runtime shut down).
    pub async fn wait(self) -> Option<UploadReport> {
        self.report.await.ok()
    }
}

/// Collaborators shared by every session spawned from one use case
#[derive(Clone)]
struct Collaborators {
    credential_client: Arc<dyn ICredentialClient>,
    blob_uploader: Arc<dyn IBlobUploader>,
    notify_client: Arc<dyn INotifyClient>,
}

/// Use case for uploading a single file to blob storage through the hub
pub struct UploadToBlobUseCase {
    collaborators: Collaborators,
    /// Shared client configuration. Held only while validating a call and
    /// creating its session.
    timeouts: Mutex<UploadTimeouts>,
    runtime: Option<Handle>,
}

impl UploadToBlobUseCase {
    /// Creates a new UploadToBlobUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `credential_client` - Issues blob write credentials (REQUEST_BLOB)
    /// * `blob_uploader` - Sends the bytes to storage (UPLOAD_FILE)
    /// * `notify_client` - Reports the outcome to the hub (NOTIFY_IOTHUB)
    pub fn new(
        credential_client: Arc<dyn ICredentialClient>,
        blob_uploader: Arc<dyn IBlobUploader>,
        notify_client: Arc<dyn INotifyClient>,
    ) -> Self {
        Self {
            collaborators: Collaborators {
                credential_client,
                blob_uploader,
                notify_client,
            },
            timeouts: Mutex::new(UploadTimeouts::default()),
            runtime: None,
        }
    }

    /// Sets the per-phase timeouts
    pub fn with_timeouts(self, timeouts: UploadTimeouts) -> Self {
        *self.timeouts.lock().unwrap_or_else(PoisonError::into_inner) = timeouts;
        self
    }

    /// Schedules sessions on `runtime`, allowing calls from threads that are
    /// not inside a tokio runtime
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Replaces the timeouts used by sessions created after this call
    pub fn set_timeouts(&self, timeouts: UploadTimeouts) {
        *self.timeouts.lock().unwrap_or_else(PoisonError::into_inner) = timeouts;
    }

    pub fn timeouts(&self) -> UploadTimeouts {
        *self.timeouts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Uploads the contents of an open byte stream to `blob_name`
    ///
    /// Returns as soon as the session is scheduled. `on_complete` receives
    /// the final [`UploadReport`] and `context`, exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidArgument`] if `blob_name` is empty or
    /// malformed, or if no runtime is available to schedule the session.
    /// `on_complete` is not invoked in that case.
    pub fn upload_to_blob<R, F, C>(
        &self,
        blob_name: &str,
        source: R,
        on_complete: F,
        context: C,
    ) -> Result<UploadTicket, UploadError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        F: FnOnce(UploadReport, C) + Send + 'static,
        C: Send + 'static,
    {
        let (session, timeouts, runtime) = self.prepare(blob_name)?;
        Ok(self.schedule(session, timeouts, runtime, Box::new(source), on_complete, context))
    }

    /// Uploads the file at `path` to `blob_name`
    ///
    /// The file is opened before anything is scheduled, so an unopenable
    /// path fails here without contacting the hub.
    ///
    /// # Errors
    ///
    /// [`UploadError::InvalidArgument`] for an empty blob name or path,
    /// [`UploadError::FileNotFound`] if the path cannot be opened as a file.
    pub fn upload_file_to_blob<F, C>(
        &self,
        blob_name: &str,
        path: impl AsRef<Path>,
        on_complete: F,
        context: C,
    ) -> Result<UploadTicket, UploadError>
    where
        F: FnOnce(UploadReport, C) + Send + 'static,
        C: Send + 'static,
    {
        let path = path.as_ref();
        let (session, timeouts, runtime) = self.prepare(blob_name)?;

        if path.as_os_str().is_empty() {
            return Err(UploadError::InvalidArgument(
                "file path is null or empty".to_string(),
            ));
        }
        let file = open_source_file(path)?;

        Ok(self.schedule(session, timeouts, runtime, Box::new(file), on_complete, context))
    }

    /// Synchronous part of every call: validation and session creation
    fn prepare(&self, blob_name: &str) -> Result<(UploadSession, UploadTimeouts, Handle), UploadError> {
        let guard = self.timeouts.lock().unwrap_or_else(PoisonError::into_inner);

        let blob_name = BlobName::new(blob_name)?;
        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| {
                UploadError::InvalidArgument(
                    "no tokio runtime available to schedule the upload".to_string(),
                )
            })?,
        };

        let session = UploadSession::new(blob_name);
        Ok((session, *guard, runtime))
    }

    fn schedule<F, C>(
        &self,
        session: UploadSession,
        timeouts: UploadTimeouts,
        runtime: Handle,
        source: ByteSource,
        on_complete: F,
        context: C,
    ) -> UploadTicket
    where
        F: FnOnce(UploadReport, C) + Send + 'static,
        C: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let session_id = session.id();
        let blob_name = session.blob_name().clone();
        let collaborators = self.collaborators.clone();

        info!(session_id = %session_id, blob_name = %blob_name, "Upload session scheduled");

        runtime.spawn(async move {
            let report = run_session(collaborators, session, source, timeouts).await;
            on_complete(report.clone(), context);
            // The ticket may have been dropped
            let _ = tx.send(report);
        });

        UploadTicket {
            session_id,
            blob_name,
            report: rx,
        }
    }
}

/// Opens `path` for reading, rejecting anything that is not a regular file
fn open_source_file(path: &Path) -> Result<tokio::fs::File, UploadError> {
    let not_found = |reason: String| UploadError::FileNotFound {
        path: PathBuf::from(path),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| not_found(e.to_string()))?;
    let metadata = file.metadata().map_err(|e| not_found(e.to_string()))?;
    if !metadata.is_file() {
        return Err(not_found("not a regular file".to_string()));
    }

    Ok(tokio::fs::File::from_std(file))
}

/// Runs all phases of one session and returns its final report
async fn run_session(
    collaborators: Collaborators,
    mut session: UploadSession,
    source: ByteSource,
    timeouts: UploadTimeouts,
) -> UploadReport {
    let report = match drive(&collaborators, &mut session, source, timeouts)
        .await
        .and_then(|()| session.report())
    {
        Ok(report) => report,
        Err(e) => {
            error!(session_id = %session.id(), error = %e, "Upload session left the protocol order");
            session.abort(UploadError::Upload(format!("internal state error: {e}")))
        }
    };

    info!(
        session_id = %report.session_id(),
        blob_name = %report.blob_name(),
        state = %report.state(),
        detail = %report.status_detail(),
        "Upload session finished"
    );
    report
}

async fn drive(
    collaborators: &Collaborators,
    session: &mut UploadSession,
    source: ByteSource,
    timeouts: UploadTimeouts,
) -> Result<(), DomainError> {
    let session_id = session.id();

    // ---- REQUEST_BLOB ----
    debug!(session_id = %session_id, blob_name = %session.blob_name(), "REQUEST_BLOB");
    let requested = timeout(
        timeouts.credential,
        collaborators
            .credential_client
            .request_credential(session.blob_name()),
    )
    .await;

    let credential = match requested {
        Ok(Ok(credential)) => credential,
        Ok(Err(e)) => {
            let reason = format!("{e:#}");
            warn!(session_id = %session_id, error = %reason, "Credential request failed");
            drop(source);
            return session.credential_failed(reason);
        }
        Err(_) => {
            warn!(session_id = %session_id, "Credential request timed out");
            drop(source);
            return session.credential_failed(format!(
                "timed out after {}s",
                timeouts.credential.as_secs_f64()
            ));
        }
    };
    session.credential_acquired(credential.clone())?;

    // ---- UPLOAD_FILE ----
    debug!(
        session_id = %session_id,
        correlation_id = %credential.correlation_id(),
        blob_uri = %credential.blob_uri(),
        "UPLOAD_FILE"
    );
    let (outcome, upload_error) =
        upload_phase(collaborators, &credential, source, timeouts.upload).await;
    drop(credential);
    if let Some(err) = &upload_error {
        warn!(session_id = %session_id, error = %err, "Upload failed, notifying hub");
    }
    session.upload_finished(outcome, upload_error)?;

    // ---- NOTIFY_IOTHUB ----
    let Some(outcome) = session.outcome().cloned() else {
        return Err(DomainError::InvalidState {
            from: session.phase().name().to_string(),
            to: "NOTIFY_IOTHUB".to_string(),
        });
    };
    debug!(
        session_id = %session_id,
        correlation_id = %outcome.correlation_id(),
        success = outcome.is_success(),
        "NOTIFY_IOTHUB"
    );
    let notified = timeout(
        timeouts.notify,
        collaborators
            .notify_client
            .notify(outcome.correlation_id(), &outcome),
    )
    .await;

    let notify_error = match notified {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(UploadError::Notify(format!("{e:#}"))),
        Err(_) => Some(UploadError::Notify(format!(
            "timed out after {}s",
            timeouts.notify.as_secs_f64()
        ))),
    };
    if let Some(err) = &notify_error {
        warn!(
            session_id = %session_id,
            correlation_id = %outcome.correlation_id(),
            error = %err,
            "Hub notification failed"
        );
    }

    session.notify_finished(notify_error)
}

/// UPLOAD_FILE: never fails; every failure becomes an unsuccessful outcome
async fn upload_phase(
    collaborators: &Collaborators,
    credential: &UploadCredential,
    source: ByteSource,
    upload_timeout: Duration,
) -> (UploadOutcome, Option<UploadError>) {
    let correlation_id = credential.correlation_id().clone();

    if let Some(expired_at) = credential.expires_at().filter(|_| credential.is_expired()) {
        drop(source);
        let reason = format!("credential expired at {}", expired_at.to_rfc3339());
        return (
            UploadOutcome::client_failure(correlation_id, reason.clone()),
            Some(UploadError::Upload(reason)),
        );
    }

    // The source is moved into the call and released when it returns
    let uploaded = timeout(
        upload_timeout,
        collaborators
            .blob_uploader
            .upload(credential.blob_uri(), credential.sas_token(), source),
    )
    .await;

    match uploaded {
        Ok(Ok(result)) => {
            debug!(
                status_code = result.status_code,
                bytes_sent = ?result.bytes_sent,
                "Storage answered upload"
            );
            (UploadOutcome::from_result(correlation_id, &result), None)
        }
        Ok(Err(e)) => {
            let reason = format!("{e:#}");
            (
                UploadOutcome::client_failure(correlation_id, reason.clone()),
                Some(UploadError::Upload(reason)),
            )
        }
        Err(_) => {
            let reason = format!("timed out after {}s", upload_timeout.as_secs_f64());
            (
                UploadOutcome::client_failure(correlation_id, reason.clone()),
                Some(UploadError::Upload(reason)),
            )
        }
    }
}
