//! Error types for trackfetch-dl
//!
//! Request-level failures only. Row-level failures never reach this type;
//! they end up as strings in the batch report.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::batch_orchestrator::BatchError;
use crate::services::manifest_parser::ManifestError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or absent upload (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upload larger than the configured limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Internal server error (500)
    #[error("An error occurred: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// trackfetch-common error
    #[error("Common error: {0}")]
    Common(#[from] trackfetch_common::Error),
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Manifest(ManifestError::Decode(e)) => {
                ApiError::BadRequest(format!("Manifest is not valid UTF-8: {}", e))
            }
            BatchError::Manifest(e @ ManifestError::Csv(_)) => ApiError::Internal(e.to_string()),
            BatchError::Setup(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::Internal(_) | ApiError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
