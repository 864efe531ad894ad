//! End-to-end tests: the upload use case wired to the HTTP adapters

use std::sync::Arc;

use hubfile_core::domain::TerminalState;
use hubfile_core::usecases::UploadToBlobUseCase;
use hubfile_iothub::client::HubClient;
use hubfile_iothub::credential::HubCredentialClient;
use hubfile_iothub::notify::HubNotifyClient;
use hubfile_iothub::storage::HttpBlobUploader;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn use_case(client: Arc<HubClient>) -> UploadToBlobUseCase {
    UploadToBlobUseCase::new(
        Arc::new(HubCredentialClient::new(client.clone())),
        Arc::new(HttpBlobUploader::new()),
        Arc::new(HubNotifyClient::new(client)),
    )
}

#[tokio::test]
async fn test_file_upload_runs_all_three_phases() {
    let (server, client) = common::setup_hub_mock().await;
    common::mount_sas_uri(&server, "corr-e2e", "report.txt").await;
    common::mount_blob_put(&server, "report.txt", 201).await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .and(body_json(serde_json::json!({
            "correlationId": "corr-e2e",
            "isSuccess": true,
            "statusCode": 201,
            "statusDescription": "Created"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.txt");
    std::fs::write(&file, b"sensor readings").unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    let ticket = use_case(client)
        .upload_file_to_blob(
            "report.txt",
            &file,
            move |report, tx: tokio::sync::oneshot::Sender<_>| {
                let _ = tx.send(report);
            },
            tx,
        )
        .unwrap();

    let report = ticket.wait().await.expect("session dropped");
    let from_callback = rx.await.unwrap();
    assert_eq!(report, from_callback);

    assert!(report.success(), "detail: {}", report.status_detail());
    assert_eq!(report.state(), TerminalState::Done);
    assert_eq!(report.correlation_id().map(|c| c.as_str()), Some("corr-e2e"));
    assert_eq!(report.status_code(), Some(201));
    assert!(report.notify_error().is_none());
}

#[tokio::test]
async fn test_storage_rejection_is_notified_as_failure() {
    let (server, client) = common::setup_hub_mock().await;
    common::mount_sas_uri(&server, "corr-403", "data.bin").await;
    common::mount_blob_put(&server, "data.bin", 403).await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .and(body_json(serde_json::json!({
            "correlationId": "corr-403",
            "isSuccess": false,
            "statusCode": 403,
            "statusDescription": "Forbidden"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ticket = use_case(client)
        .upload_to_blob("data.bin", &b"payload"[..], |_, ()| {}, ())
        .unwrap();
    let report = ticket.wait().await.unwrap();

    assert!(!report.success());
    assert_eq!(report.state(), TerminalState::Failed);
    assert_eq!(report.status_code(), Some(403));
}

#[tokio::test]
async fn test_credential_rejection_skips_upload_and_notify() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("file upload not configured"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let ticket = use_case(client)
        .upload_to_blob("data.bin", &b"payload"[..], |_, ()| {}, ())
        .unwrap();
    let report = ticket.wait().await.unwrap();

    assert!(!report.success());
    assert!(report.correlation_id().is_none());
    assert!(report.status_detail().contains("file upload not configured"));
}

#[tokio::test]
async fn test_notify_failure_keeps_upload_success() {
    let (server, client) = common::setup_hub_mock().await;
    common::mount_sas_uri(&server, "corr-n", "n.bin").await;
    common::mount_blob_put(&server, "n.bin", 201).await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .respond_with(ResponseTemplate::new(500).set_body_string("hub unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let ticket = use_case(client)
        .upload_to_blob("n.bin", &b"payload"[..], |_, ()| {}, ())
        .unwrap();
    let report = ticket.wait().await.unwrap();

    assert!(report.success());
    assert!(report.notify_error().is_some());
    assert!(report.status_detail().contains("notify failed"));
}

#[tokio::test]
async fn test_missing_file_contacts_nobody() {
    let (server, client) = common::setup_hub_mock().await;
    common::mount_notification(&server).await;

    let result = use_case(client).upload_file_to_blob(
        "x.bin",
        "/definitely/not/here.bin",
        |_, ()| {},
        (),
    );

    assert!(result.is_err());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
