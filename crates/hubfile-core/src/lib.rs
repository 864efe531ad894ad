//! hubfile Core - Device-side file upload orchestration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `UploadCredential`, `UploadOutcome`, `UploadSession`, `UploadReport`
//! - **Use cases** - `UploadToBlobUseCase` (REQUEST_BLOB -> UPLOAD_FILE -> NOTIFY_IOTHUB)
//! - **Port definitions** - Traits for adapters: `ICredentialClient`, `IBlobUploader`, `INotifyClient`
//!
//! # Architecture
//!
//! The domain module contains the upload state machine with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases drive domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
