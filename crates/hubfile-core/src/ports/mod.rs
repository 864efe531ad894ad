//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. The upload use case depends on these traits;
//! their implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ICredentialClient`] - Requests a blob write credential from the hub (REQUEST_BLOB)
//! - [`IBlobUploader`] - Sends the file bytes to storage (UPLOAD_FILE)
//! - [`INotifyClient`] - Reports the upload outcome to the hub (NOTIFY_IOTHUB)

pub mod blob_uploader;
pub mod credential_client;
pub mod notify_client;

pub use blob_uploader::{ByteSource, IBlobUploader};
pub use credential_client::ICredentialClient;
pub use notify_client::INotifyClient;
