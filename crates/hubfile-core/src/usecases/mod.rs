//! Use cases (interactors) for hubfile
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate state rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`UploadToBlobUseCase`] - Three-phase file upload through the hub

pub mod upload_to_blob;

pub use upload_to_blob::{UploadTicket, UploadTimeouts, UploadToBlobUseCase};
