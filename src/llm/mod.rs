//! LLM integration for Eve.
//!
//! The assistant talks to a local Ollama server. The `LlmProvider` trait
//! keeps the two pipeline stages independent of the concrete backend.

pub mod ollama;
pub mod provider;

pub use ollama::OllamaClient;
pub use provider::*;

use std::sync::Arc;

use crate::config::AssistantConfig;

/// Create an LLM provider from configuration.
pub fn create_provider(http: reqwest::Client, config: &AssistantConfig) -> Arc<dyn LlmProvider> {
    tracing::info!("Using Ollama at {} (model: {})", config.ollama_url, config.model);
    Arc::new(OllamaClient::new(http, config.ollama_url.clone(), config.model.clone()))
}
