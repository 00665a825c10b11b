//! In-process `InferenceModel` for tests. Counts calls and records the last prompt.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{InferenceModel, LlmError, ModelReply, Usage};

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Throttle,
    Timeout,
    Fail(String),
}

pub struct MockModel {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String)>>,
}

impl MockModel {
    pub const USAGE: Usage = Usage {
        input_tokens: 1200,
        output_tokens: 340,
    };

    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Behavior::Reply(text.to_string()))
    }

    pub fn throttling() -> Self {
        Self::with(Behavior::Throttle)
    }

    pub fn timing_out() -> Self {
        Self::with(Behavior::Timeout)
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Behavior::Fail(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(prompt, system)` of the most recent call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceModel for MockModel {
    async fn invoke(&self, prompt: &str, system: &str) -> Result<ModelReply, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((prompt.to_string(), system.to_string()));

        match &self.behavior {
            Behavior::Reply(text) => Ok(ModelReply {
                text: text.clone(),
                usage: Self::USAGE,
            }),
            Behavior::Throttle => Err(LlmError::Throttled("Too many requests".to_string())),
            Behavior::Timeout => Err(LlmError::Timeout("Model timed out".to_string())),
            Behavior::Fail(message) => Err(LlmError::Api(message.clone())),
        }
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}
