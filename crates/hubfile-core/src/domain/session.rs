//! UploadSession domain entity
//!
//! An [`UploadSession`] is one end-to-end execution of the three-phase
//! upload protocol for a single request:
//!
//! ```text
//! REQUEST_BLOB ──ok──> UPLOAD_FILE ──(ok|err)──> NOTIFY_IOTHUB ──> DONE | FAILED
//!      │
//!      └──err──> FAILED
//! ```
//!
//! Phases only move forward. Each transition method checks the current
//! phase and returns [`DomainError::InvalidState`] otherwise, so a phase can
//! never be re-entered within one session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::UploadCredential;
use super::errors::{DomainError, UploadError};
use super::newtypes::{BlobName, CorrelationId, SessionId};
use super::outcome::UploadOutcome;

/// Current phase of an upload session, carrying only the data that phase needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase {
    /// Waiting for the hub to issue a credential
    RequestBlob,
    /// Credential acquired; bytes are being sent to storage
    UploadFile {
        /// Credential for the destination blob
        credential: UploadCredential,
    },
    /// Upload finished (either way); reporting the outcome to the hub
    NotifyIotHub {
        /// Outcome to report
        outcome: UploadOutcome,
        /// Upload error, when the upload did not succeed
        upload_error: Option<UploadError>,
    },
    /// Upload succeeded
    Done {
        /// Final status detail
        detail: String,
    },
    /// Credential or upload failed
    Failed {
        /// The error that decided the session's result
        error: UploadError,
        /// Final status detail
        detail: String,
    },
}

impl UploadPhase {
    /// Protocol name of the phase
    pub fn name(&self) -> &'static str {
        match self {
            UploadPhase::RequestBlob => "REQUEST_BLOB",
            UploadPhase::UploadFile { .. } => "UPLOAD_FILE",
            UploadPhase::NotifyIotHub { .. } => "NOTIFY_IOTHUB",
            UploadPhase::Done { .. } => "DONE",
            UploadPhase::Failed { .. } => "FAILED",
        }
    }

    /// Returns true for DONE and FAILED
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Done { .. } | UploadPhase::Failed { .. })
    }
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal state reached by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    Done,
    Failed,
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalState::Done => write!(f, "DONE"),
            TerminalState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Final result of a session, delivered to the completion callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    session_id: SessionId,
    blob_name: BlobName,
    state: TerminalState,
    status_detail: String,
    correlation_id: Option<CorrelationId>,
    status_code: Option<u16>,
    error: Option<UploadError>,
    notify_error: Option<UploadError>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl UploadReport {
    /// True if the upload itself succeeded (notify failures do not count)
    pub fn success(&self) -> bool {
        self.state == TerminalState::Done
    }

    pub fn status_detail(&self) -> &str {
        &self.status_detail
    }

    pub fn state(&self) -> TerminalState {
        self.state
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn blob_name(&self) -> &BlobName {
        &self.blob_name
    }

    /// Correlation id issued by the hub; `None` if REQUEST_BLOB failed
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Storage status code; `None` if no upload was attempted
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// The credential or upload error that failed the session
    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    /// Secondary error from NOTIFY_IOTHUB, if any
    pub fn notify_error(&self) -> Option<&UploadError> {
        self.notify_error.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// One execution of the upload protocol
#[derive(Debug, Clone)]
pub struct UploadSession {
    id: SessionId,
    blob_name: BlobName,
    phase: UploadPhase,
    correlation_id: Option<CorrelationId>,
    status_code: Option<u16>,
    notify_error: Option<UploadError>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl UploadSession {
    /// Creates a new session in REQUEST_BLOB
    pub fn new(blob_name: BlobName) -> Self {
        Self {
            id: SessionId::new(),
            blob_name,
            phase: UploadPhase::RequestBlob,
            correlation_id: None,
            status_code: None,
            notify_error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn blob_name(&self) -> &BlobName {
        &self.blob_name
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// The credential, available only during UPLOAD_FILE
    pub fn credential(&self) -> Option<&UploadCredential> {
        match &self.phase {
            UploadPhase::UploadFile { credential } => Some(credential),
            _ => None,
        }
    }

    /// The outcome, available only during NOTIFY_IOTHUB
    pub fn outcome(&self) -> Option<&UploadOutcome> {
        match &self.phase {
            UploadPhase::NotifyIotHub { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    fn invalid_transition(&self, to: &str) -> DomainError {
        DomainError::InvalidState {
            from: self.phase.name().to_string(),
            to: to.to_string(),
        }
    }

    /// REQUEST_BLOB -> UPLOAD_FILE
    pub fn credential_acquired(&mut self, credential: UploadCredential) -> Result<(), DomainError> {
        if !matches!(self.phase, UploadPhase::RequestBlob) {
            return Err(self.invalid_transition("UPLOAD_FILE"));
        }
        self.correlation_id = Some(credential.correlation_id().clone());
        self.phase = UploadPhase::UploadFile { credential };
        Ok(())
    }

    /// REQUEST_BLOB -> FAILED
    pub fn credential_failed(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        if !matches!(self.phase, UploadPhase::RequestBlob) {
            return Err(self.invalid_transition("FAILED"));
        }
        let error = UploadError::Credential(reason.into());
        self.finish(UploadPhase::Failed {
            detail: error.to_string(),
            error,
        });
        Ok(())
    }

    /// UPLOAD_FILE -> NOTIFY_IOTHUB
    ///
    /// Drops the credential. `upload_error` must be set when the outcome is
    /// not successful so the final report can carry it.
    pub fn upload_finished(
        &mut self,
        outcome: UploadOutcome,
        upload_error: Option<UploadError>,
    ) -> Result<(), DomainError> {
        if !matches!(self.phase, UploadPhase::UploadFile { .. }) {
            return Err(self.invalid_transition("NOTIFY_IOTHUB"));
        }
        let upload_error = match upload_error {
            None if !outcome.is_success() => Some(UploadError::Upload(format!(
                "storage returned {}: {}",
                outcome.status_code(),
                outcome.status_description()
            ))),
            other => other,
        };
        self.status_code = Some(outcome.status_code());
        self.phase = UploadPhase::NotifyIotHub {
            outcome,
            upload_error,
        };
        Ok(())
    }

    /// NOTIFY_IOTHUB -> DONE | FAILED
    ///
    /// The terminal state follows the upload outcome; a notify error is only
    /// appended to the detail.
    pub fn notify_finished(&mut self, notify_error: Option<UploadError>) -> Result<(), DomainError> {
        let (outcome, upload_error) = match &self.phase {
            UploadPhase::NotifyIotHub {
                outcome,
                upload_error,
            } => (outcome.clone(), upload_error.clone()),
            _ => return Err(self.invalid_transition("DONE")),
        };

        let mut detail = match &upload_error {
            Some(err) => err.to_string(),
            None => format!(
                "upload succeeded ({}): {}",
                outcome.status_code(),
                outcome.status_description()
            ),
        };
        if let Some(err) = &notify_error {
            detail.push_str("; ");
            detail.push_str(&err.to_string());
        }
        self.notify_error = notify_error;

        let next = match upload_error {
            None => UploadPhase::Done { detail },
            Some(error) => UploadPhase::Failed { error, detail },
        };
        self.finish(next);
        Ok(())
    }

    fn finish(&mut self, terminal: UploadPhase) {
        self.phase = terminal;
        self.completed_at = Some(Utc::now());
    }

    /// Forces the session into FAILED and returns its report
    ///
    /// Used only when the protocol order was violated; an already terminal
    /// result is replaced.
    pub fn abort(&mut self, error: UploadError) -> UploadReport {
        let detail = error.to_string();
        self.finish(UploadPhase::Failed {
            error: error.clone(),
            detail: detail.clone(),
        });
        self.build_report(TerminalState::Failed, detail, Some(error))
    }

    /// Builds the report; only valid once a terminal state was reached
    pub fn report(&self) -> Result<UploadReport, DomainError> {
        let (state, detail, error) = match &self.phase {
            UploadPhase::Done { detail } => (TerminalState::Done, detail.clone(), None),
            UploadPhase::Failed { error, detail } => {
                (TerminalState::Failed, detail.clone(), Some(error.clone()))
            }
            _ => return Err(self.invalid_transition("REPORT")),
        };
        Ok(self.build_report(state, detail, error))
    }

    fn build_report(
        &self,
        state: TerminalState,
        status_detail: String,
        error: Option<UploadError>,
    ) -> UploadReport {
        UploadReport {
            session_id: self.id,
            blob_name: self.blob_name.clone(),
            state,
            status_detail,
            correlation_id: self.correlation_id.clone(),
            status_code: self.status_code,
            error,
            notify_error: self.notify_error.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at.unwrap_or_else(Utc::now),
        }
    }
}
