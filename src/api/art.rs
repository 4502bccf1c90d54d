use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use super::headers::{quoted_etag, HeaderMapExt, X_IMAGE_NAME};
use crate::error::ApiError;
use crate::models::ArtRequest;
use crate::services::{ArtRenderer, ImageRegistry};

/// Get art for a display
///
/// Returns raw packed pixel bytes that can be pushed straight to the panel:
/// row-major, first pixel in the most significant bits, no header. The
/// served image is named in `X-Image-Name`.
#[utoipa::path(
    post,
    path = "/art",
    request_body = ArtRequest,
    responses(
        (status = 200, description = "Packed pixel data", content_type = "application/octet-stream",
            headers(
                ("ETag" = String, description = "Content hash of the body"),
                ("X-Image-Name" = String, description = "Image that was served"),
            )
        ),
        (status = 304, description = "Client already holds this content"),
        (status = 422, description = "Invalid request"),
        (status = 500, description = "Transform failed"),
    ),
    tag = "Art"
)]
pub async fn handle_art(
    State(registry): State<Arc<ImageRegistry>>,
    State(renderer): State<Arc<ArtRenderer>>,
    headers: HeaderMap,
    body: Result<Json<ArtRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let options = request.validate()?;

    let handle = registry.select(request.image_name.as_deref());
    tracing::info!(
        requested = ?request.image_name,
        selected = %handle.id(),
        "Selected image"
    );

    let art = renderer.render(handle, options).await?;

    let mut response = if headers.etag_matches(art.etag()) {
        tracing::debug!(etag = %art.etag(), "Client copy is current");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        response
    } else {
        tracing::info!("Returning {} bytes", art.len());
        let mut response = Response::new(Body::from(art.bytes().clone()));
        let response_headers = response.headers_mut();
        response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(art.len()));
        response
    };

    let response_headers = response.headers_mut();
    if let Ok(etag) = HeaderValue::from_str(&quoted_etag(art.etag())) {
        response_headers.insert(header::ETAG, etag);
    }
    if let Ok(name) = HeaderValue::from_str(handle.id().as_str()) {
        response_headers.insert(X_IMAGE_NAME, name);
    }

    Ok(response)
}
