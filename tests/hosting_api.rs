use gofile_relay::config::Settings;
use gofile_relay::gofile::GofileClient;
use gofile_relay::relay::RelayError;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_settings(api_base: &str, upload_base: Option<&str>) -> Settings {
    Settings {
        telegram_token: "dummy".to_string(),
        hosting_api_base: api_base.to_string(),
        hosting_upload_host: "gofile.io".to_string(),
        hosting_upload_base: upload_base.map(String::from),
        connect_timeout_secs: 5,
        request_timeout_secs: 30,
        upload_retries: 0,
    }
}

fn staged_fixture(content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}

#[tokio::test]
async fn selects_server_from_discovery_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getServer"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"server": "store1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GofileClient::new(&test_settings(&server.uri(), None)).expect("client");
    let selected = client.best_server().await.expect("server selection");

    assert_eq!(selected, "store1");
}

#[tokio::test]
async fn malformed_discovery_body_is_a_server_selection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getServer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {}})))
        .mount(&server)
        .await;

    let client = GofileClient::new(&test_settings(&server.uri(), None)).expect("client");

    assert!(matches!(
        client.best_server().await,
        Err(RelayError::ServerSelection(_))
    ));
}

#[tokio::test]
async fn discovery_http_failure_is_a_server_selection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getServer"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = GofileClient::new(&test_settings(&server.uri(), None)).expect("client");

    match client.best_server().await {
        Err(RelayError::ServerSelection(detail)) => assert!(detail.contains("503")),
        other => panic!("expected ServerSelection, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_reports_the_download_page_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploadFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "data": {"downloadPage": "https://gofile.io/d/abc123"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        GofileClient::new(&test_settings("http://unused", Some(&server.uri()))).expect("client");
    let staged = staged_fixture(b"file payload");

    let link = client
        .upload("store1", staged.path(), "report.pdf")
        .await
        .expect("upload");

    assert_eq!(link, "https://gofile.io/d/abc123");
}

#[tokio::test]
async fn service_rejection_is_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploadFile"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "error"})),
        )
        .mount(&server)
        .await;

    let client =
        GofileClient::new(&test_settings("http://unused", Some(&server.uri()))).expect("client");
    let staged = staged_fixture(b"payload");

    match client.upload("store1", staged.path(), "a.bin").await {
        Err(RelayError::RemoteRejected(status)) => assert_eq!(status, "error"),
        other => panic!("expected RemoteRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_http_failure_is_an_upload_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploadFile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client =
        GofileClient::new(&test_settings("http://unused", Some(&server.uri()))).expect("client");
    let staged = staged_fixture(b"payload");

    match client.upload("store1", staged.path(), "a.bin").await {
        Err(RelayError::Upload(detail)) => assert!(detail.contains("500")),
        other => panic!("expected Upload, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_staged_file_is_an_io_error() {
    let server = MockServer::start().await;

    let client =
        GofileClient::new(&test_settings("http://unused", Some(&server.uri()))).expect("client");

    let missing = std::path::Path::new("/nonexistent/gofile-relay-test.bin");
    assert!(matches!(
        client.upload("store1", missing, "a.bin").await,
        Err(RelayError::Io(_))
    ));

    // The hosting API must never be contacted when staging is broken.
    assert!(server.received_requests().await.is_some_and(|r| r.is_empty()));
}

#[tokio::test]
async fn discovery_then_upload_follows_the_two_call_sequence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getServer"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"server": "store7"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/uploadFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "data": {"downloadPage": "https://gofile.io/d/xyz"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        GofileClient::new(&test_settings(&server.uri(), Some(&server.uri()))).expect("client");
    let staged = staged_fixture(b"two-call payload");

    let target = client.best_server().await.expect("server selection");
    let link = client
        .upload(&target, staged.path(), "clip.mp4")
        .await
        .expect("upload");

    assert_eq!(target, "store7");
    assert_eq!(link, "https://gofile.io/d/xyz");
}
