//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::analysis::request::AnalysisRequest;
use crate::analysis::service::{run_analysis, AnalysisResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /analyze (also mounted at POST /)
///
/// Dispatches on `analysis_mode` (full, `per_problem`, `synthesis`), makes one
/// model call, and returns `{success, summary, usage}`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let Json(body) = payload
        .map_err(|e| AppError::Validation(format!("Invalid JSON in request: {}", e.body_text())))?;

    let request = AnalysisRequest::from_value(body)?;
    info!("Analysis request accepted: mode={}", request.mode());

    let response = run_analysis(state.llm.as_ref(), &request).await?;

    Ok(Json(response))
}

/// OPTIONS /analyze (also mounted at OPTIONS /)
///
/// CORS preflight: 200, empty body.
pub async fn handle_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}
