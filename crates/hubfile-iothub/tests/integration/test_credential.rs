//! Integration tests for the SAS URI request (REQUEST_BLOB)

use hubfile_core::domain::BlobName;
use hubfile_core::ports::credential_client::ICredentialClient;
use hubfile_iothub::credential::HubCredentialClient;
use hubfile_iothub::HubError;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_request_credential_sends_blob_name_and_auth() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files"))
        .and(query_param("api-version", "2016-11-14"))
        .and(header("Authorization", common::DEVICE_TOKEN))
        .and(body_json(serde_json::json!({ "blobName": "logs/today.txt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::sas_uri_reply(
            &server,
            "corr-1",
            "logs/today.txt",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = HubCredentialClient::new(client);
    let blob = BlobName::new("logs/today.txt").unwrap();
    let credential = credentials
        .request_credential(&blob)
        .await
        .expect("credential request failed");

    assert_eq!(credential.correlation_id().as_str(), "corr-1");
    assert_eq!(
        credential.blob_uri().path(),
        "/uploads/dev-01/logs/today.txt"
    );
    assert_eq!(credential.sas_token().as_query(), common::SAS_QUERY);
}

#[tokio::test]
async fn test_request_credential_unauthorized() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files"))
        .respond_with(ResponseTemplate::new(401).set_body_string("IotHubUnauthorizedAccess"))
        .mount(&server)
        .await;

    let credentials = HubCredentialClient::new(client);
    let err = credentials
        .request_sas_uri(&BlobName::new("a.bin").unwrap())
        .await
        .unwrap_err();

    match err {
        HubError::Unauthorized(body) => assert_eq!(body, "IotHubUnauthorizedAccess"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_credential_throttled() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .mount(&server)
        .await;

    let credentials = HubCredentialClient::new(client);
    let err = credentials
        .request_sas_uri(&BlobName::new("a.bin").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HubError::TooManyRequests { retry_after } if retry_after.as_secs() == 5
    ));
}

#[tokio::test]
async fn test_request_credential_malformed_reply() {
    let (server, client) = common::setup_hub_mock().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-01/files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"correlationId\":\"c\"}"))
        .mount(&server)
        .await;

    let credentials = HubCredentialClient::new(client);
    let err = credentials
        .request_credential(&BlobName::new("a.bin").unwrap())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid response"));
}
