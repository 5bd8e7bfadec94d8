//! Provider trait — the abstraction over generation backends.
//!
//! A Provider knows how to send a short exchange to an LLM and get a
//! complete response back. Research steps that need structured output ask
//! for it through [`ResponseFormat::JsonSchema`]; the provider is expected
//! to constrain decoding accordingly, but callers still validate the result.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, OpenRouter, Ollama, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "o3-mini", "gpt-4o-mini")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature; omitted for reasoning models that reject it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Requested output shape
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ProviderRequest {
    /// A plain system + user exchange with provider defaults.
    ///
    /// An empty `system` sends the user message alone.
    pub fn new(model: impl Into<String>, system: impl Into<String>, prompt: impl Into<String>) -> Self {
        let system = system.into();
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    /// Name of the requested JSON schema, if any.
    pub fn schema_name(&self) -> Option<&str> {
        match &self.response_format {
            ResponseFormat::JsonSchema { name, .. } => Some(name),
            ResponseFormat::Text => None,
        }
    }
}

/// The output shape requested from the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text
    #[default]
    Text,

    /// A JSON object matching `schema`
    JsonSchema {
        name: String,
        schema: serde_json::Value,
        #[serde(default)]
        strict: bool,
    },
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The planner, extractor, and synthesizer call `complete()` without knowing
/// which backend is being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
