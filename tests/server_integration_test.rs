//! Server integration tests that test the actual server behavior.
//!
//! These tests start a real TCP server and verify behavior that can only
//! be tested with actual network connections.

mod common;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use common::fixtures;
use epaper_art::models::AppConfig;
use epaper_art::server::{build_router, create_app_state};

/// Start a test server on an available port and return the port number.
async fn start_test_server(images: &tempfile::TempDir) -> u16 {
    let config = AppConfig {
        image_location: images.path().to_path_buf(),
        ..AppConfig::default()
    };
    let state = create_app_state(&config).expect("Failed to create app state");
    let app = build_router(state);

    // Bind to port 0 to get an available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

    port
}

fn fixture_dir() -> tempfile::TempDir {
    let images = tempfile::tempdir().expect("Failed to create temp dir");
    fixtures::write_images(images.path());
    images
}

/// Read until the server closes the connection.
async fn read_to_close(stream: &mut TcpStream) -> String {
    let mut response = Vec::new();
    tokio::time::timeout(
        tokio::time::Duration::from_secs(2),
        stream.read_to_end(&mut response),
    )
    .await
    .expect("Timeout waiting for connection close - server may not be closing connections")
    .expect("Failed to read response");
    String::from_utf8_lossy(&response).to_string()
}

/// ESP32 HTTPClient asks for keep-alive but never reuses connections, so
/// the server must close every connection after one response.
#[tokio::test]
async fn test_server_closes_connection_after_response() {
    let images = fixture_dir();
    let port = start_test_server(&images).await;

    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}"))
        .await
        .expect("Failed to connect");

    let request = "GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: keep-alive\r\n\r\n";
    stream
        .write_all(request.as_bytes())
        .await
        .expect("Failed to write request");

    let response = read_to_close(&mut stream).await;
    assert!(response.contains("HTTP/1.1 200"), "Should get 200 OK response");
    assert!(
        response.to_lowercase().contains("connection: close"),
        "Response should have Connection: close header"
    );
    assert!(response.contains(r#"{"ok":true}"#));
}

#[tokio::test]
async fn test_art_over_socket() {
    let images = fixture_dir();
    let port = start_test_server(&images).await;

    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}"))
        .await
        .expect("Failed to connect");

    let body = r##"{"image_name": "landscape", "palette": ["#000", "#fff"], "dimensions": [8, 8], "pixels_per_byte": 8}"##;
    let request = format!(
        "POST /art HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(request.as_bytes())
        .await
        .expect("Failed to write request");

    let response = read_to_close(&mut stream).await.to_lowercase();
    assert!(response.starts_with("http/1.1 200"));
    assert!(response.contains("content-type: application/octet-stream"));
    assert!(response.contains("content-length: 8"));
    assert!(response.contains("x-image-name: landscape.png"));
    assert!(response.contains("connection: close"));
}

/// Without a single decodable image the server must refuse to start.
#[test]
fn test_empty_image_directory_prevents_startup() {
    let images = tempfile::tempdir().unwrap();
    std::fs::write(images.path().join(fixtures::NOT_AN_IMAGE), "plain text").unwrap();

    let config = AppConfig {
        image_location: images.path().to_path_buf(),
        ..AppConfig::default()
    };
    let err = create_app_state(&config).err().expect("startup should fail");
    assert!(err.to_string().contains("Cannot start without images"));
}

#[test]
fn test_missing_image_directory_prevents_startup() {
    let images = tempfile::tempdir().unwrap();
    let config = AppConfig {
        image_location: images.path().join("nope"),
        ..AppConfig::default()
    };
    assert!(create_app_state(&config).is_err());
}
