//! Runs one analysis: prompt → single model call → JSON summary.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::analysis::request::{AnalysisRequest, FullRequest};
use crate::errors::AppError;
use crate::llm_client::{call_json, InferenceModel, Usage};

const FINAL_CODE_FIELD: &str = "final_code";

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub summary: Value,
    pub usage: Usage,
}

/// Builds the prompt for `request`, calls the model exactly once and parses the reply.
/// Never retries; throttling and timeouts surface as their own `AppError` kinds.
pub async fn run_analysis(
    model: &dyn InferenceModel,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, AppError> {
    let prompt = request.build_prompt();
    let system = request.system_prompt();

    let (mut summary, usage) = call_json(model, &prompt, &system).await?;

    if let AnalysisRequest::Full(full) = request {
        inject_final_code(&mut summary, full);
    }

    info!(
        "Analysis complete: mode={}, input_tokens={}, output_tokens={}",
        request.mode(),
        usage.input_tokens,
        usage.output_tokens
    );

    Ok(AnalysisResponse {
        success: true,
        summary,
        usage,
    })
}

/// Copies `dpp.final_code` into the summary when the model left it out.
fn inject_final_code(summary: &mut Value, request: &FullRequest) {
    let Some(code) = request.dpp.get(FINAL_CODE_FIELD).filter(|v| !v.is_null()) else {
        return;
    };
    if let Value::Object(fields) = summary {
        fields
            .entry(FINAL_CODE_FIELD)
            .or_insert_with(|| code.clone());
    }
}
