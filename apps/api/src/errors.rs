use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model throttled: {0}")]
    Throttling(String),

    #[error("Model timed out: {0}")]
    Timeout(String),

    #[error("Inference error: {0}")]
    Inference(String),
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::Validation(format!("Missing required field: {field}"))
    }

    /// HTTP status, stable error code and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Throttling(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "THROTTLING",
                "Service temporarily busy, please retry".to_string(),
            ),
            AppError::Timeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "Analysis took too long, please retry".to_string(),
            ),
            AppError::Inference(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BEDROCK_ERROR",
                format!("Analysis failed: {msg}"),
            ),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Throttled(msg) => AppError::Throttling(msg),
            LlmError::Timeout(msg) => AppError::Timeout(msg),
            other => AppError::Inference(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => tracing::info!("Rejected request: {msg}"),
            AppError::Throttling(msg) => tracing::warn!("Model throttled: {msg}"),
            AppError::Timeout(msg) => tracing::warn!("Model timed out: {msg}"),
            AppError::Inference(msg) => tracing::error!("Inference error: {msg}"),
        }

        let (status, code, message) = self.parts();

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
