use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::InferenceModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide model client, built once at startup. Handlers only borrow it.
    pub llm: Arc<dyn InferenceModel>,
    pub config: Config,
}
