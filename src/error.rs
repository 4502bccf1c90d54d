use std::path::PathBuf;

use art_pipeline::TransformError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransformError> for ApiError {
    fn from(e: TransformError) -> Self {
        match e {
            TransformError::InvalidRequest(message) => ApiError::InvalidRequest(message),
            other => ApiError::Render(RenderError::Transform(other)),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(_) | RegistryError::Empty(_) => {
                ApiError::NotFound(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Failure of a single transform. Cloned to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Render task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No image named '{0}'")]
    NotFound(String),

    #[error("No decodable images in {0}")]
    Empty(String),

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
