//! LLM Client: the single point of entry for all model calls in the analysis API.
//!
//! No other module talks to Bedrock directly. Handlers depend on the
//! `InferenceModel` trait so the shared client can be swapped in tests.
use std::error::Error as StdError;

use async_trait::async_trait;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_bedrockruntime::{
    error::{DisplayErrorContext, SdkError},
    operation::converse::ConverseError,
    types::{ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[cfg(test)]
pub mod mock;
pub mod prompts;

/// Longest slice of unparseable model output written to the log.
const INVALID_JSON_SNIPPET_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model throttled: {0}")]
    Throttled(String),

    #[error("Model timed out: {0}")]
    Timeout(String),

    #[error("Model API error: {0}")]
    Api(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Token accounting reported by the model for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    fn from_counts(input_tokens: i32, output_tokens: i32) -> Self {
        Self {
            input_tokens: input_tokens.max(0) as u32,
            output_tokens: output_tokens.max(0) as u32,
        }
    }
}

/// Raw text returned by the model plus its usage.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub usage: Usage,
}

/// A remote model that accepts a prompt and returns text.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    async fn invoke(&self, prompt: &str, system: &str) -> Result<ModelReply, LlmError>;

    fn model_id(&self) -> &str;
}

/// Bedrock-backed model client. Built once at startup and shared via `AppState`.
///
/// Retries (adaptive, bounded attempts) and timeouts live in the SDK config;
/// this type never retries on its own.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    model_id: String,
    max_tokens: i32,
    temperature: f32,
}

impl LlmClient {
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::adaptive().with_max_attempts(config.max_attempts))
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(config.connect_timeout)
                    .read_timeout(config.read_timeout)
                    .build(),
            )
            .load()
            .await;

        Self {
            client: Client::new(&sdk_config),
            model_id: config.model_id.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl InferenceModel for LlmClient {
    async fn invoke(&self, prompt: &str, system: &str) -> Result<ModelReply, LlmError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(system.to_string()))
            .messages(message)
            .inference_config(
                InferenceConfiguration::builder()
                    .max_tokens(self.max_tokens)
                    .temperature(self.temperature)
                    .build(),
            )
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let text = output
            .output()
            .and_then(|o| o.as_message().ok())
            .and_then(|m| m.content().iter().find_map(|block| block.as_text().ok()))
            .cloned()
            .ok_or(LlmError::EmptyContent)?;

        let usage = output
            .usage()
            .map(|u| Usage::from_counts(u.input_tokens(), u.output_tokens()))
            .unwrap_or_default();

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            usage.input_tokens, usage.output_tokens
        );

        Ok(ModelReply { text, usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn classify_sdk_error(err: SdkError<ConverseError>) -> LlmError {
    // Connect and read timeouts come back as dispatch or response failures.
    let timed_out = match &err {
        SdkError::DispatchFailure(failure) => failure.is_timeout(),
        SdkError::ResponseError(_) => io_timeout_in_chain(&err),
        _ => false,
    };
    if timed_out {
        return LlmError::Timeout(DisplayErrorContext(&err).to_string());
    }

    match err.into_service_error() {
        ConverseError::ThrottlingException(e) => LlmError::Throttled(e.to_string()),
        ConverseError::ModelTimeoutException(e) => LlmError::Timeout(e.to_string()),
        other => LlmError::Api(DisplayErrorContext(&other).to_string()),
    }
}

fn io_timeout_in_chain(err: &(dyn StdError + 'static)) -> bool {
    let mut current = err.source();
    while let Some(source) = current {
        if let Some(io) = source.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        current = source.source();
    }
    false
}

/// Calls the model once and parses its text reply as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn call_json(
    model: &dyn InferenceModel,
    prompt: &str,
    system: &str,
) -> Result<(Value, Usage), LlmError> {
    let reply = model.invoke(prompt, system).await?;
    let value = parse_json_reply(&reply.text)?;
    Ok((value, reply.usage))
}

/// Parses model text as JSON after removing an optional fence pair.
/// Unparseable text is logged (truncated) and returned as a hard error.
pub fn parse_json_reply(text: &str) -> Result<Value, LlmError> {
    let content = strip_json_fences(text);
    serde_json::from_str(content).map_err(|e| {
        warn!(
            "Failed to parse LLM response: {}",
            truncate_chars(content, INVALID_JSON_SNIPPET_CHARS)
        );
        LlmError::InvalidJson(e)
    })
}

/// Strips a leading ```` ``` ```` / ```` ```json ```` line and a trailing ```` ``` ```` line.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    // The opening fence line is dropped whole, language tag included.
    let body = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => "",
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
