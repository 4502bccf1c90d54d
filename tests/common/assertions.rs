//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status,
        expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is packed art with the expected length
pub fn assert_art(response: &TestResponse, expected_len: usize) {
    assert_ok(response);
    assert_eq!(
        response.header("content-type"),
        Some("application/octet-stream"),
        "Expected Content-Type: application/octet-stream"
    );
    assert_eq!(response.body.len(), expected_len, "Unexpected body length");
    assert_eq!(
        response.header("content-length"),
        Some(expected_len.to_string().as_str())
    );

    let etag = response.header("etag").expect("Expected an ETag header");
    assert!(
        etag.starts_with('"') && etag.ends_with('"'),
        "ETag should be quoted: {etag}"
    );
    assert!(
        response.header("x-image-name").is_some(),
        "Expected X-Image-Name header"
    );
}

/// Assert the standard JSON error body
pub fn assert_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"].as_u64(), Some(expected.as_u16() as u64));
    assert!(json["error"].is_string(), "Expected error message: {json}");
}
