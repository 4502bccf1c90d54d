//! Test application factory for integration tests.

use axum::{body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use epaper_art::models::AppConfig;
use epaper_art::server::{build_router, create_app_state, AppState};
use epaper_art::services::{ArtRenderer, ImageRegistry};

use super::fixtures;

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub registry: Arc<ImageRegistry>,
    pub renderer: Arc<ArtRenderer>,
    // keeps the image directory alive for the app's lifetime
    _images: TempDir,
}

impl TestApp {
    /// Create a new test application over the standard fixture images
    pub fn new() -> Self {
        let images = tempfile::tempdir().expect("Failed to create temp dir");
        fixtures::write_images(images.path());
        Self::from_dir(images)
    }

    /// Create a test application serving whatever `images` contains
    pub fn from_dir(images: TempDir) -> Self {
        let state = Self::create_state(images.path());
        let registry = state.registry.clone();
        let renderer = state.renderer.clone();

        Self {
            router: build_router(state),
            registry,
            renderer,
            _images: images,
        }
    }

    /// Build state the same way the server does, from a config pointing at `dir`
    pub fn create_state(dir: &std::path::Path) -> AppState {
        let config = AppConfig {
            image_location: dir.to_path_buf(),
            ..AppConfig::default()
        };
        create_app_state(&config).expect("Failed to create app state")
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        self.post_json_with_headers(path, &[], body).await
    }

    /// Make a POST request with JSON body and custom headers
    pub async fn post_json_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::post(path).header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Get a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
