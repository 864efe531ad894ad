//! Integration tests for hubfile-iothub
//!
//! Uses wiremock to simulate the hub's file-upload endpoints and blob
//! storage, and verifies the adapters on their own and wired into the
//! upload use case.

mod common;

mod test_credential;
mod test_end_to_end;
mod test_notify;
mod test_storage;
