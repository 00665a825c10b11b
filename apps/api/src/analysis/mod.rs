// Interview analysis: request dispatch, prompt construction, single model call.
// All LLM calls go through llm_client; no direct Bedrock SDK calls here.

pub mod handlers;
pub mod models;
pub mod prompt_builder;
pub mod prompts;
pub mod request;
pub mod service;
