//! Integration tests for the block blob upload (UPLOAD_FILE)

use hubfile_core::domain::SasToken;
use hubfile_core::ports::blob_uploader::IBlobUploader;
use hubfile_iothub::storage::HttpBlobUploader;
use url::Url;
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn blob_uri(server: &MockServer) -> Url {
    Url::parse(&format!("{}/uploads/dev-01/data.bin", server.uri())).unwrap()
}

fn sas() -> SasToken {
    SasToken::new("sv=2018-03-28&sig=abc").unwrap()
}

#[tokio::test]
async fn test_upload_puts_block_blob() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/uploads/dev-01/data.bin"))
        .and(query_param("sig", "abc"))
        .and(header("x-ms-blob-type", "BlockBlob"))
        .and(body_bytes(b"hello blob".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let uploader = HttpBlobUploader::new();
    let result = uploader
        .upload(&blob_uri(&server), &sas(), Box::new(&b"hello blob"[..]))
        .await
        .expect("upload failed");

    assert!(result.is_success());
    assert_eq!(result.status_code, 201);
    assert_eq!(result.status_description, "Created");
    assert_eq!(result.bytes_sent, Some(10));
}

#[tokio::test]
async fn test_upload_rejection_is_a_result() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/uploads/dev-01/data.bin"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AuthenticationFailed"))
        .mount(&server)
        .await;

    let uploader = HttpBlobUploader::new();
    let result = uploader
        .upload(&blob_uri(&server), &sas(), Box::new(&b"x"[..]))
        .await
        .expect("a rejection is not a transport error");

    assert!(!result.is_success());
    assert_eq!(result.status_code, 403);
    assert_eq!(result.status_description, "Forbidden: AuthenticationFailed");
}

#[tokio::test]
async fn test_upload_transport_failure_is_an_error() {
    // Nothing listens on port 1
    let uri = Url::parse("http://127.0.0.1:1/uploads/dev-01/data.bin").unwrap();

    let uploader = HttpBlobUploader::new();
    let result = uploader.upload(&uri, &sas(), Box::new(&b"x"[..])).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_upload_oversized_source_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let uploader = HttpBlobUploader::new().with_max_blob_size(3);
    let err = uploader
        .upload(&blob_uri(&server), &sas(), Box::new(&b"four"[..]))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("exceeds 3 bytes"));
}
