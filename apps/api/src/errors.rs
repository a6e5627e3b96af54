use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::generation::ats_scoring::AtsError;
use crate::generation::generator::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::Invalid(msg) => AppError::Validation(msg),
            GenerationError::Upstream(e) => AppError::Llm(e.to_string()),
        }
    }
}

impl From<AtsError> for AppError {
    fn from(e: AtsError) -> Self {
        match e {
            AtsError::Invalid(msg) => AppError::Validation(msg),
            AtsError::Timeout => {
                AppError::UpstreamTimeout("LLM API timed out while scoring the resume.".to_string())
            }
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Document(e) if matches!(e, DocumentError::UnsupportedType(_)) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_DOCUMENT", e.to_string())
            }
            AppError::Document(e) => (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT", e.to_string()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UpstreamTimeout(msg) => {
                tracing::warn!("Upstream timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", format!("LLM error: {msg}"))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
