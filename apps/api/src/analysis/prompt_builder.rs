//! User-prompt construction for each analysis mode.
//!
//! Prompts are pure functions of the request: no clocks, no randomness.
//! `serde_json::Value` objects keep keys sorted, so embedded JSON is stable too.

use serde_json::{Map, Value};

use crate::analysis::models::{Role, Turn};
use crate::analysis::prompts::{
    per_problem_instructions, FULL_CUSTOM_INSTRUCTIONS, FULL_DEFAULT_INSTRUCTIONS,
    SYNTHESIS_INSTRUCTIONS,
};
use crate::analysis::request::{FullRequest, PerProblemRequest, SynthesisRequest};
use crate::llm_client::prompts::OUTPUT_ONLY_JSON;

/// Context fields echoed into a per-problem prompt.
const PER_PROBLEM_CONTEXT_FIELDS: &[&str] = &["mode", "session", "live_code", "all_problems_in_session"];

/// Context fields echoed into a synthesis prompt.
const SYNTHESIS_CONTEXT_FIELDS: &[&str] = &["mode", "session", "live_code"];

/// Display names for the two transcript roles.
#[derive(Debug, Clone, Copy)]
pub struct Speakers {
    pub assistant: &'static str,
    pub user: &'static str,
}

pub const HR_SPEAKERS: Speakers = Speakers {
    assistant: "AI HR",
    user: "Candidate",
};

pub const CODING_SPEAKERS: Speakers = Speakers {
    assistant: "Interviewer",
    user: "Candidate",
};

impl FullRequest {
    pub fn build_prompt(&self) -> String {
        let session_mode = self
            .dpp
            .get("mode")
            .and_then(Value::as_str)
            .unwrap_or("interview");

        let mut parts = vec![
            "Analyze this session and produce a JSON summary.\n".to_string(),
            format!("## Session Mode\n{session_mode}\n"),
            format!("## Turn Count\n{} user turns\n", user_turn_count(&self.transcript)),
            format!(
                "## Dynamic Page Prompt (DPP)\n```json\n{}\n```\n",
                pretty_json(&self.dpp)
            ),
            format!(
                "## Transcript\n{}\n",
                format_transcript(&self.transcript, HR_SPEAKERS)
            ),
        ];

        if let Some(schema) = &self.schema {
            parts.push(format!("## Output Schema\n```json\n{}\n```\n", pretty_json(schema)));
        }

        let instructions = if self.summary_prompt.is_some() {
            FULL_CUSTOM_INSTRUCTIONS
        } else {
            FULL_DEFAULT_INSTRUCTIONS
        };
        parts.push(format!("\n## Instructions\n{instructions}\n{OUTPUT_ONLY_JSON}"));

        parts.join("\n")
    }
}

impl PerProblemRequest {
    pub fn build_prompt(&self) -> String {
        let focus = self.focus();
        let instructions = per_problem_instructions(focus.title(), &focus.id);

        [
            "Analyze the candidate's work on a single problem from this coding session and produce a JSON result.\n".to_string(),
            format!(
                "## Problem Focus\nid: {}\ntitle: {}\ndifficulty: {}\n",
                focus.id,
                focus.title(),
                focus.difficulty()
            ),
            format!("## Candidate\n{}\n", candidate_name(&self.dpp)),
            format!(
                "## Session Context\n```json\n{}\n```\n",
                pretty_json(&select_fields(&self.dpp, PER_PROBLEM_CONTEXT_FIELDS))
            ),
            format!(
                "## Transcript\n{}\n",
                format_transcript(&self.transcript, CODING_SPEAKERS)
            ),
            format!("\n## Instructions\n{instructions}\n{OUTPUT_ONLY_JSON}"),
        ]
        .join("\n")
    }
}

impl SynthesisRequest {
    pub fn build_prompt(&self) -> String {
        let results = Value::Array(self.problem_results.clone());

        [
            "Combine the per-problem analyses below into one overall assessment of the candidate.\n".to_string(),
            format!("## Candidate\n{}\n", candidate_name(&self.dpp)),
            format!(
                "## Session Context\n```json\n{}\n```\n",
                pretty_json(&select_fields(&self.dpp, SYNTHESIS_CONTEXT_FIELDS))
            ),
            format!(
                "## Per-Problem Results ({} problems)\n```json\n{}\n```\n",
                self.problem_results.len(),
                pretty_json(&results)
            ),
            format!("\n## Instructions\n{SYNTHESIS_INSTRUCTIONS}\n{OUTPUT_ONLY_JSON}"),
        ]
        .join("\n")
    }
}

/// Renders turns as `[n] Speaker: content`, numbered from 1.
pub fn format_transcript(turns: &[Turn], speakers: Speakers) -> String {
    turns
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let speaker = match turn.role {
                Role::Assistant => speakers.assistant,
                Role::User | Role::Unknown => speakers.user,
            };
            format!("[{}] {}: {}", i + 1, speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user_turn_count(turns: &[Turn]) -> usize {
    turns.iter().filter(|t| t.role == Role::User).count()
}

/// Copies only `keys` (when present and non-null) out of a context object.
pub fn select_fields(context: &Value, keys: &[&str]) -> Value {
    let mut selected = Map::new();
    for key in keys {
        if let Some(value) = context.get(*key).filter(|v| !v.is_null()) {
            selected.insert((*key).to_string(), value.clone());
        }
    }
    Value::Object(selected)
}

fn candidate_name(context: &Value) -> &str {
    let candidate = context.get("candidate");
    ["full_name", "first_name"]
        .iter()
        .filter_map(|key| candidate.and_then(|c| c.get(*key)).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or("Unknown candidate")
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
