//! Integration tests for the download module.
//!
//! These tests verify the full transfer flow against mock HTTP servers.

use std::path::Path;

use taskdl_core::download::{Destination, DownloadError, HttpClient, PART_SUFFIX};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a mock server with a file endpoint.
async fn setup_mock_file(path_str: &str, content: &[u8]) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&mock_server)
        .await;

    mock_server
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("should read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_download_full_flow_preserves_content() {
    // Setup
    let content = b"This is the complete file content for testing.\nLine 2.\nLine 3.";
    let mock_server = setup_mock_file("/document.pdf", content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    // Execute
    let client = HttpClient::new();
    let url = format!("{}/document.pdf", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    let result = client
        .download(&url, &destination, &CancellationToken::new())
        .await;

    // Verify
    assert_eq!(
        result.expect("download should succeed"),
        content.len() as u64
    );
    assert_eq!(destination.file_name(), "document.pdf");

    let file_path = temp_dir.path().join("task1").join("document.pdf");
    let downloaded_content = std::fs::read(&file_path).expect("should read file");
    assert_eq!(
        downloaded_content, content,
        "Downloaded content should match original"
    );
    assert_eq!(
        dir_entries(&temp_dir.path().join("task1")),
        ["document.pdf"],
        "no partial file should remain"
    );
}

#[tokio::test]
async fn test_download_404_leaves_no_final_file() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let url = format!("{}/missing.pdf", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    let result = client
        .download(&url, &destination, &CancellationToken::new())
        .await;

    match result {
        Err(DownloadError::HttpStatus { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    let err_text = client
        .download(&url, &destination, &CancellationToken::new())
        .await
        .unwrap_err()
        .to_string();
    assert!(err_text.contains("404 Not Found"), "got: {err_text}");

    assert!(!destination.final_path().exists());
    assert!(!destination.part_path().exists());
}

#[tokio::test]
async fn test_download_server_error_is_reported() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let url = format!("{}/file.bin", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    let result = client
        .download(&url, &destination, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(DownloadError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_download_root_path_uses_fallback_name() {
    let content = b"root content";
    let mock_server = setup_mock_file("/", content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = format!("{}/", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    client
        .download(&url, &destination, &CancellationToken::new())
        .await
        .expect("download should succeed");

    let name = destination.file_name();
    assert!(name.starts_with("file_"), "got: {name}");
    assert!(name["file_".len()..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(
        std::fs::read(destination.final_path()).expect("should read file"),
        content
    );
}

#[tokio::test]
async fn test_download_percent_encoded_name_is_decoded() {
    let mock_server = setup_mock_file("/my%20report.txt", b"report").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = format!("{}/my%20report.txt", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    client
        .download(&url, &destination, &CancellationToken::new())
        .await
        .expect("download should succeed");

    assert!(temp_dir.path().join("task1").join("my report.txt").exists());
}

#[tokio::test]
async fn test_download_reuses_existing_task_directory() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("b"))
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let client = HttpClient::new();
    let cancel = CancellationToken::new();

    for name in ["a.txt", "b.txt"] {
        let url = format!("{}/{name}", mock_server.uri());
        let destination = Destination::resolve(temp_dir.path(), "shared", &url);
        client
            .download(&url, &destination, &cancel)
            .await
            .expect("download should succeed");
    }

    assert_eq!(
        dir_entries(&temp_dir.path().join("shared")),
        ["a.txt", "b.txt"]
    );
}

#[tokio::test]
async fn test_download_overwrites_stale_partial_file() {
    let content = b"fresh";
    let mock_server = setup_mock_file("/data.bin", content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let task_dir = temp_dir.path().join("task1");
    std::fs::create_dir_all(&task_dir).expect("should create dir");
    std::fs::write(
        task_dir.join(format!("data.bin{PART_SUFFIX}")),
        b"stale bytes from an interrupted attempt that are longer",
    )
    .expect("should write stale part");

    let client = HttpClient::new();
    let url = format!("{}/data.bin", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    client
        .download(&url, &destination, &CancellationToken::new())
        .await
        .expect("download should succeed");

    assert_eq!(
        std::fs::read(task_dir.join("data.bin")).expect("should read file"),
        content
    );
    assert_eq!(dir_entries(&task_dir), ["data.bin"]);
}

#[tokio::test]
async fn test_download_overwrites_existing_final_file() {
    let mock_server = setup_mock_file("/data.bin", b"new").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let task_dir = temp_dir.path().join("task1");
    std::fs::create_dir_all(&task_dir).expect("should create dir");
    std::fs::write(task_dir.join("data.bin"), b"old").expect("should write file");

    let client = HttpClient::new();
    let url = format!("{}/data.bin", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    client
        .download(&url, &destination, &CancellationToken::new())
        .await
        .expect("download should succeed");

    assert_eq!(
        std::fs::read(task_dir.join("data.bin")).expect("should read file"),
        b"new"
    );
}

#[tokio::test]
async fn test_download_cancelled_before_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = format!("{}/slow.bin", mock_server.uri());
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = client.download(&url, &destination, &cancel).await;

    let err = result.unwrap_err();
    assert!(err.is_cancelled(), "got: {err:?}");
    assert!(!destination.final_path().exists());
}

/// Serves one response that promises more body bytes than it sends, then
/// closes the connection.
async fn serve_truncated_body(declared_len: usize, sent: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("should accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.expect("should read request");
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {declared_len}\r\n\r\n");
        socket
            .write_all(head.as_bytes())
            .await
            .expect("should write head");
        socket.write_all(sent).await.expect("should write body");
        socket.flush().await.expect("should flush");
    });

    format!("http://{addr}/truncated.bin")
}

#[tokio::test]
async fn test_download_truncated_body_keeps_part_and_no_final_file() {
    let url = serve_truncated_body(100, b"0123456789").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let destination = Destination::resolve(temp_dir.path(), "task1", &url);
    let result = client
        .download(&url, &destination, &CancellationToken::new())
        .await;

    assert!(
        matches!(result, Err(DownloadError::Network { .. })),
        "got: {result:?}"
    );
    assert!(
        destination.part_path().exists(),
        "partial file should be left for the next attempt"
    );
    assert!(
        !destination.final_path().exists(),
        "final name must never hold a partial body"
    );
}
