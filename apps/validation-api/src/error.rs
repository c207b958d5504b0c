//! Error types for the validation API

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validation_core::PipelineError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::MalformedBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                rejection.body_text(),
            ),
            ApiError::Pipeline(err) => {
                tracing::error!("Pipeline error: {}", err);
                let code = match err {
                    PipelineError::Lookup(_) => "STORAGE_ERROR",
                    PipelineError::Regeneration(_) => "REGENERATION_FAILED",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
