//! Shared test helpers for hub integration tests
//!
//! Each helper mounts the endpoints a scenario needs on a wiremock server
//! that plays both the hub and the storage account.

use std::sync::Arc;

use hubfile_iothub::client::HubClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DEVICE_ID: &str = "dev-01";
pub const DEVICE_TOKEN: &str = "SharedAccessSignature sr=test-hub/devices/dev-01&sig=x";
pub const CONTAINER: &str = "uploads";
pub const SAS_QUERY: &str = "?sv=2018-03-28&sr=b&sig=abc";

/// Starts a mock server and returns a device client pointing at it
pub async fn setup_hub_mock() -> (MockServer, Arc<HubClient>) {
    let server = MockServer::start().await;
    let client = HubClient::with_base_url(server.uri(), DEVICE_ID).with_sas_token(DEVICE_TOKEN);
    (server, Arc::new(client))
}

/// The SAS URI reply the hub sends for `blob_name`, with storage on `server`
pub fn sas_uri_reply(server: &MockServer, correlation_id: &str, blob_name: &str) -> serde_json::Value {
    serde_json::json!({
        "correlationId": correlation_id,
        "hostName": server.uri(),
        "containerName": CONTAINER,
        "blobName": format!("{DEVICE_ID}/{blob_name}"),
        "sasToken": SAS_QUERY
    })
}

/// Mounts `POST /devices/{id}/files` answering with a SAS URI on `server`
pub async fn mount_sas_uri(server: &MockServer, correlation_id: &str, blob_name: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/devices/{DEVICE_ID}/files")))
        .and(query_param("api-version", "2016-11-14"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(sas_uri_reply(server, correlation_id, blob_name)),
        )
        .mount(server)
        .await;
}

/// Mounts `PUT /{container}/{device}/{blob}` answering with `status`
pub async fn mount_blob_put(server: &MockServer, blob_name: &str, status: u16) {
    Mock::given(method("PUT"))
        .and(path(format!("/{CONTAINER}/{DEVICE_ID}/{blob_name}")))
        .and(query_param("sig", "abc"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts `POST /devices/{id}/files/notifications` answering 204
pub async fn mount_notification(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/devices/{DEVICE_ID}/files/notifications")))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}
