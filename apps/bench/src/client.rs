//! HTTP client for the analysis endpoint. Every outcome becomes a `CallResult`.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tracing::warn;

/// Per-call wait ceiling.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(25);

/// Outcome of one network call. Never an `Err`: failures are data here.
#[derive(Debug, Clone)]
pub struct CallResult {
    /// HTTP 2xx with a JSON body.
    pub ok: bool,
    /// HTTP status, or 0 when no response arrived.
    pub status: u16,
    pub elapsed: Duration,
    pub body: Option<Value>,
    pub error: Option<String>,
}

impl CallResult {
    /// Transport and application both succeeded (`success: true` in the body).
    pub fn succeeded(&self) -> bool {
        self.ok
            && self
                .body
                .as_ref()
                .and_then(|b| b.get("success"))
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// The `summary` object of a successful call.
    pub fn summary(&self) -> Option<&Value> {
        if !self.succeeded() {
            return None;
        }
        self.body.as_ref().and_then(|b| b.get("summary"))
    }

    /// `(input_tokens, output_tokens)` of a successful call.
    pub fn tokens(&self) -> (Option<u64>, Option<u64>) {
        if !self.succeeded() {
            return (None, None);
        }
        let usage = self.body.as_ref().and_then(|b| b.get("usage"));
        let count = |key: &str| usage.and_then(|u| u.get(key)).and_then(Value::as_u64);
        (count("input_tokens"), count("output_tokens"))
    }

    /// Human-readable failure reason.
    pub fn failure_reason(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        self.body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    url: String,
}

impl AnalysisClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POSTs `payload` as JSON and times the round trip.
    pub async fn call(&self, payload: &Value) -> CallResult {
        let start = Instant::now();

        let response = match self.http.post(&self.url).json(payload).send().await {
            Ok(r) => r,
            Err(e) => {
                let elapsed = start.elapsed();
                warn!("Request to {} failed after {:?}: {}", self.url, elapsed, e);
                return CallResult {
                    ok: false,
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    elapsed,
                    body: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let elapsed = start.elapsed();
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            warn!("Endpoint returned {}: {}", status, detail);
            return CallResult {
                ok: false,
                status: status.as_u16(),
                elapsed,
                body: None,
                error: Some(format!("HTTP {}: {}", status.as_u16(), detail)),
            };
        }

        let body = response.json::<Value>().await;
        let elapsed = start.elapsed();

        match body {
            Ok(body) => CallResult {
                ok: true,
                status: status.as_u16(),
                elapsed,
                body: Some(body),
                error: None,
            },
            Err(e) => CallResult {
                ok: false,
                status: status.as_u16(),
                elapsed,
                body: None,
                error: Some(format!("invalid response body: {e}")),
            },
        }
    }
}
