//! Integration tests for the completion notification (NOTIFY_IOTHUB)

use hubfile_core::domain::{CorrelationId, UploadOutcome, UploadResult};
use hubfile_core::ports::notify_client::INotifyClient;
use hubfile_iothub::notify::HubNotifyClient;
use hubfile_iothub::HubError;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_notify_success_outcome() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .and(query_param("api-version", "2016-11-14"))
        .and(header("Authorization", common::DEVICE_TOKEN))
        .and(body_json(serde_json::json!({
            "correlationId": "corr-5",
            "isSuccess": true,
            "statusCode": 201,
            "statusDescription": "Created"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HubNotifyClient::new(client);
    let corr = CorrelationId::new("corr-5").unwrap();
    let outcome = UploadOutcome::from_result(corr.clone(), &UploadResult::success(201, "Created"));

    notifier
        .notify(&corr, &outcome)
        .await
        .expect("notification failed");
}

#[tokio::test]
async fn test_notify_failure_outcome_is_reported() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .and(body_json(serde_json::json!({
            "correlationId": "corr-6",
            "isSuccess": false,
            "statusCode": 500,
            "statusDescription": "connection reset"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HubNotifyClient::new(client);
    let corr = CorrelationId::new("corr-6").unwrap();
    let outcome = UploadOutcome::client_failure(corr.clone(), "connection reset");

    notifier.notify(&corr, &outcome).await.unwrap();
}

#[tokio::test]
async fn test_notify_unknown_correlation() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files/notifications"))
        .respond_with(ResponseTemplate::new(404).set_body_string("correlation id not found"))
        .mount(&server)
        .await;

    let notifier = HubNotifyClient::new(client);
    let corr = CorrelationId::new("stale").unwrap();
    let outcome = UploadOutcome::client_failure(corr.clone(), "x");

    let err = notifier.send(&corr, &outcome).await.unwrap_err();
    assert!(matches!(err, HubError::NotFound(_)));
}
