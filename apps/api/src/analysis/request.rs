//! Analysis request variants and their validation.
//!
//! The body's `analysis_mode` field picks the variant. Anything other than
//! `per_problem` or `synthesis` (including no field at all) is a full analysis.
//! Validation runs before any model call.

use std::borrow::Cow;
use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use crate::analysis::models::{ProblemFocus, Turn};
use crate::analysis::prompts::{
    HR_ANALYSIS_SYSTEM_TEMPLATE, PER_PROBLEM_SYSTEM_TEMPLATE, SYNTHESIS_SYSTEM_TEMPLATE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_RULES, PLAIN_LANGUAGE_RULE};

pub const MODE_FIELD: &str = "analysis_mode";

static NO_FOCUS: ProblemFocus = ProblemFocus {
    id: String::new(),
    title: None,
    difficulty: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Full,
    PerProblem,
    Synthesis,
}

impl AnalysisMode {
    pub fn from_discriminator(value: Option<&str>) -> Self {
        match value {
            Some("per_problem") => AnalysisMode::PerProblem,
            Some("synthesis") => AnalysisMode::Synthesis,
            _ => AnalysisMode::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Full => "full",
            AnalysisMode::PerProblem => "per_problem",
            AnalysisMode::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-session analysis (HR demo, or a caller-supplied system prompt).
#[derive(Debug, Clone, Deserialize)]
pub struct FullRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript: Vec<Turn>,
    #[serde(default)]
    pub dpp: Value,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub summary_prompt: Option<String>,
}

/// Analysis of one problem out of a multi-problem coding session.
#[derive(Debug, Clone, Deserialize)]
pub struct PerProblemRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript: Vec<Turn>,
    #[serde(default)]
    pub problem_focus: Option<ProblemFocus>,
    #[serde(default)]
    pub dpp: Value,
}

/// Combines already-computed per-problem results.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub problem_results: Vec<Value>,
    #[serde(default)]
    pub dpp: Value,
}

#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    Full(FullRequest),
    PerProblem(PerProblemRequest),
    Synthesis(SynthesisRequest),
}

impl AnalysisRequest {
    /// Decodes and validates a raw request body.
    pub fn from_value(body: Value) -> Result<Self, AppError> {
        let mode = AnalysisMode::from_discriminator(body.get(MODE_FIELD).and_then(Value::as_str));

        match mode {
            AnalysisMode::Full => decode::<FullRequest>(body)?.validate().map(Self::Full),
            AnalysisMode::PerProblem => decode::<PerProblemRequest>(body)?
                .validate()
                .map(Self::PerProblem),
            AnalysisMode::Synthesis => decode::<SynthesisRequest>(body)?
                .validate()
                .map(Self::Synthesis),
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisRequest::Full(_) => AnalysisMode::Full,
            AnalysisRequest::PerProblem(_) => AnalysisMode::PerProblem,
            AnalysisRequest::Synthesis(_) => AnalysisMode::Synthesis,
        }
    }

    /// System instruction for this mode. A full request's `summary_prompt` wins over the default.
    pub fn system_prompt(&self) -> Cow<'_, str> {
        match self {
            AnalysisRequest::Full(req) => match &req.summary_prompt {
                Some(custom) => Cow::Borrowed(custom.as_str()),
                None => Cow::Owned(render_system(HR_ANALYSIS_SYSTEM_TEMPLATE)),
            },
            AnalysisRequest::PerProblem(_) => Cow::Owned(render_system(PER_PROBLEM_SYSTEM_TEMPLATE)),
            AnalysisRequest::Synthesis(_) => Cow::Owned(render_system(SYNTHESIS_SYSTEM_TEMPLATE)),
        }
    }

    pub fn build_prompt(&self) -> String {
        match self {
            AnalysisRequest::Full(req) => req.build_prompt(),
            AnalysisRequest::PerProblem(req) => req.build_prompt(),
            AnalysisRequest::Synthesis(req) => req.build_prompt(),
        }
    }
}

impl FullRequest {
    fn validate(mut self) -> Result<Self, AppError> {
        if self.transcript.is_empty() {
            return Err(AppError::missing_field("transcript"));
        }
        if is_blank(&self.dpp) {
            return Err(AppError::missing_field("dpp"));
        }
        self.summary_prompt = self.summary_prompt.filter(|p| !p.trim().is_empty());
        self.schema = self.schema.filter(|s| !is_blank(s));
        Ok(self)
    }
}

impl PerProblemRequest {
    fn validate(self) -> Result<Self, AppError> {
        if self.transcript.is_empty() {
            return Err(AppError::missing_field("transcript"));
        }
        match &self.problem_focus {
            Some(focus) if !focus.id.trim().is_empty() => Ok(self),
            _ => Err(AppError::missing_field("problem_focus.id")),
        }
    }

    /// The focus problem; always present once validated.
    pub fn focus(&self) -> &ProblemFocus {
        self.problem_focus.as_ref().unwrap_or(&NO_FOCUS)
    }
}

impl SynthesisRequest {
    fn validate(self) -> Result<Self, AppError> {
        if self.problem_results.is_empty() {
            return Err(AppError::missing_field("problem_results"));
        }
        Ok(self)
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

/// Reads an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn render_system(template: &str) -> String {
    template
        .replace("{rules}", JSON_ONLY_RULES)
        .replace("{plain_language}", PLAIN_LANGUAGE_RULE)
}

/// `null`, `{}`, `[]` and `""` all count as absent.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transcript() -> Value {
        json!([
            {"role": "assistant", "content": "Tell me about yourself."},
            {"role": "user", "content": "I drive delivery routes in Lisbon."}
        ])
    }

    fn expect_validation(body: Value, field: &str) {
        match AnalysisRequest::from_value(body) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, format!("Missing required field: {field}"))
            }
            other => panic!("expected validation error for {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_mode_is_full() {
        let req = AnalysisRequest::from_value(json!({
            "transcript": transcript(),
            "dpp": {"mode": "interview"}
        }))
        .unwrap();
        assert_eq!(req.mode(), AnalysisMode::Full);
    }

    #[test]
    fn test_unrecognised_mode_is_full() {
        let req = AnalysisRequest::from_value(json!({
            "analysis_mode": "everything",
            "transcript": transcript(),
            "dpp": {"mode": "interview"}
        }))
        .unwrap();
        assert_eq!(req.mode(), AnalysisMode::Full);
    }

    #[test]
    fn test_full_requires_transcript() {
        expect_validation(json!({"dpp": {"mode": "interview"}}), "transcript");
        expect_validation(json!({"transcript": [], "dpp": {"mode": "interview"}}), "transcript");
    }

    #[test]
    fn test_full_requires_dpp() {
        expect_validation(json!({"transcript": transcript()}), "dpp");
        expect_validation(json!({"transcript": transcript(), "dpp": {}}), "dpp");
    }

    #[test]
    fn test_per_problem_requires_transcript() {
        expect_validation(
            json!({"analysis_mode": "per_problem", "problem_focus": {"id": "two-sum"}}),
            "transcript",
        );
    }

    #[test]
    fn test_per_problem_requires_focus_id() {
        expect_validation(
            json!({"analysis_mode": "per_problem", "transcript": transcript()}),
            "problem_focus.id",
        );
        expect_validation(
            json!({
                "analysis_mode": "per_problem",
                "transcript": transcript(),
                "problem_focus": {"title": "Two Sum"}
            }),
            "problem_focus.id",
        );
    }

    #[test]
    fn test_per_problem_does_not_require_dpp() {
        let req = AnalysisRequest::from_value(json!({
            "analysis_mode": "per_problem",
            "transcript": transcript(),
            "problem_focus": {"id": "two-sum"}
        }))
        .unwrap();
        assert_eq!(req.mode(), AnalysisMode::PerProblem);
    }

    #[test]
    fn test_synthesis_requires_problem_results() {
        expect_validation(json!({"analysis_mode": "synthesis", "dpp": {}}), "problem_results");
        expect_validation(
            json!({"analysis_mode": "synthesis", "problem_results": []}),
            "problem_results",
        );
    }

    #[test]
    fn test_null_fields_read_as_missing() {
        expect_validation(
            json!({"transcript": null, "dpp": {"mode": "interview"}}),
            "transcript",
        );
        expect_validation(
            json!({"analysis_mode": "per_problem", "transcript": null, "problem_focus": {"id": "two-sum"}}),
            "transcript",
        );
        expect_validation(
            json!({"analysis_mode": "synthesis", "problem_results": null}),
            "problem_results",
        );
    }

    #[test]
    fn test_wrongly_typed_field_is_validation_error() {
        let err = AnalysisRequest::from_value(json!({
            "transcript": "not a list",
            "dpp": {"mode": "interview"}
        }))
        .unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("Invalid request body")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_summary_prompt_overrides_system() {
        let req = AnalysisRequest::from_value(json!({
            "transcript": transcript(),
            "dpp": {"mode": "coding_challenge"},
            "summary_prompt": "You are a code reviewer."
        }))
        .unwrap();
        assert_eq!(req.system_prompt(), "You are a code reviewer.");
    }

    #[test]
    fn test_blank_summary_prompt_uses_default_system() {
        let req = AnalysisRequest::from_value(json!({
            "transcript": transcript(),
            "dpp": {"mode": "interview"},
            "summary_prompt": "   "
        }))
        .unwrap();
        assert!(req.system_prompt().starts_with("You are an expert HR analyst."));
    }

    #[test]
    fn test_each_mode_has_distinct_system_prompt() {
        let per_problem = AnalysisRequest::from_value(json!({
            "analysis_mode": "per_problem",
            "transcript": transcript(),
            "problem_focus": {"id": "two-sum"}
        }))
        .unwrap();
        let synthesis = AnalysisRequest::from_value(json!({
            "analysis_mode": "synthesis",
            "problem_results": [{"problem_id": "two-sum"}]
        }))
        .unwrap();

        let per_problem_system = per_problem.system_prompt();
        let synthesis_system = synthesis.system_prompt();
        assert_ne!(per_problem_system, synthesis_system);
        for system in [&per_problem_system, &synthesis_system] {
            assert!(system.contains("CRITICAL RULES"));
            assert!(!system.contains("{rules}"));
            assert!(!system.contains("{plain_language}"));
        }
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!({})));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!("  ")));
        assert!(!is_blank(&json!({"mode": "interview"})));
        assert!(!is_blank(&json!(0)));
    }
}
