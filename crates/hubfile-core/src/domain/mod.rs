//! Domain entities and business logic
//!
//! This module contains the core domain types for hubfile:
//! - Newtypes for validated blob names, correlation ids and SAS tokens
//! - Credential and outcome value types exchanged with the ports
//! - The per-call upload session state machine
//! - Domain and upload error taxonomies

pub mod credential;
pub mod errors;
pub mod newtypes;
pub mod outcome;
pub mod session;

// Re-export commonly used types
pub use credential::UploadCredential;
pub use errors::{DomainError, UploadError};
pub use newtypes::*;
pub use outcome::{UploadOutcome, UploadResult};
pub use session::{TerminalState, UploadPhase, UploadReport, UploadSession};
