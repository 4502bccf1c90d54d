//! Header helpers for art responses.

use axum::http::{HeaderMap, HeaderName};

/// Name of the image actually served, which may differ from the one asked for.
pub const X_IMAGE_NAME: HeaderName = HeaderName::from_static("x-image-name");

/// Extension trait for convenient header access.
pub trait HeaderMapExt {
    /// Get a header value as a string, returning None if missing or not ASCII.
    fn get_str(&self, name: impl axum::http::header::AsHeaderName) -> Option<&str>;

    /// Whether an `If-None-Match` header lists `etag` (unquoted) or `*`.
    fn etag_matches(&self, etag: &str) -> bool;
}

impl HeaderMapExt for HeaderMap {
    fn get_str(&self, name: impl axum::http::header::AsHeaderName) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn etag_matches(&self, etag: &str) -> bool {
        let Some(value) = self.get_str(axum::http::header::IF_NONE_MATCH) else {
            return false;
        };
        value.split(',').map(str::trim).any(|candidate| {
            candidate == "*"
                || candidate
                    .trim_start_matches("W/")
                    .trim_matches('"')
                    .eq(etag)
        })
    }
}

/// Quote an entity tag for the `ETag` header.
pub fn quoted_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}
