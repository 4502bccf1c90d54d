//! Error types for the transform pipeline.

use thiserror::Error;

/// Errors raised while validating or running a transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The request can never be satisfied; rejected before any pixel is touched.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transform hit a degenerate case while running.
    #[error("transform failed: {0}")]
    ComputeFailure(String),
}

impl TransformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TransformError::InvalidRequest(message.into())
    }

    pub(crate) fn compute(message: impl Into<String>) -> Self {
        TransformError::ComputeFailure(message.into())
    }
}
