//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::State,
    http::{header::CONNECTION, HeaderMap, HeaderValue},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::api;
use crate::error::ApiError;
use crate::models::{AppConfig, ArtRequest, ColorInput};
use crate::services::{ArtRenderer, ImageRegistry, RenderCache};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ImageRegistry>,
    pub renderer: Arc<ArtRenderer>,
}

impl AppState {
    pub fn new(registry: ImageRegistry, cache: RenderCache) -> Self {
        Self {
            registry: Arc::new(registry),
            renderer: Arc::new(ArtRenderer::new(cache)),
        }
    }
}

/// Scan the configured image directory and build application state.
///
/// Fails when no image can be decoded; the server must not start serving
/// without at least one image.
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let registry = ImageRegistry::scan(&config.image_location).map_err(|e| {
        anyhow::anyhow!(
            "Cannot start without images ({}): {e}",
            config.image_location.display()
        )
    })?;

    tracing::info!(
        images = registry.len(),
        cache_max_entries = config.cache.max_entries,
        "Application state ready"
    );

    Ok(AppState::new(
        registry,
        RenderCache::bounded(config.cache.max_entries),
    ))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "epaper-art API",
        description = "Cropped, dithered and bit-packed art for e-paper displays",
        license(name = "MIT")
    ),
    paths(api::handle_art, api::handle_healthz),
    components(schemas(ArtRequest, ColorInput, api::HealthResponse)),
    tags(
        (name = "Art", description = "Packed image data for displays"),
        (name = "Health", description = "Liveness checks")
    )
)]
pub struct ApiDoc;

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
/// It includes the `Connection: close` header to prevent connection
/// accumulation from ESP32 clients.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/art", post(handle_art))
        .route("/healthz", get(handle_healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // ESP32 HTTP clients open a fresh connection per request and never
        // reuse the old one.
        .layer(SetResponseHeaderLayer::overriding(
            CONNECTION,
            HeaderValue::from_static("close"),
        ))
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_art(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ArtRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Response, ApiError> {
    api::handle_art(State(state.registry), State(state.renderer), headers, body).await
}

async fn handle_healthz() -> Json<api::HealthResponse> {
    api::handle_healthz().await
}
