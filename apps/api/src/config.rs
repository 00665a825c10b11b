use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_id: String,
    pub max_tokens: i32,
    pub temperature: f32,
    /// Total attempts for the SDK's adaptive retry policy (first try included).
    pub max_attempts: u32,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            model_id: lookup("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            max_tokens: parse_or(&lookup, "MAX_TOKENS", 4096)?,
            temperature: parse_or(&lookup, "TEMPERATURE", 0.3)?,
            max_attempts: parse_or(&lookup, "BEDROCK_MAX_ATTEMPTS", 3)?,
            read_timeout: Duration::from_secs(parse_or(&lookup, "BEDROCK_READ_TIMEOUT_SECS", 60)?),
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "BEDROCK_CONNECT_TIMEOUT_SECS",
                10,
            )?),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
