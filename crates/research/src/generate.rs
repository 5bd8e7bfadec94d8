//! Schema-constrained generation.
//!
//! Every model call in a research run goes through a [`Generator`]: it builds
//! the [`ProviderRequest`], asks for a strict JSON schema when the caller
//! wants structured output, and decodes the reply into a typed value. The
//! provider is trusted to constrain decoding, but the result is still parsed
//! and rejected with [`GenerationError::Schema`] if it does not fit.

use std::sync::Arc;

use delve_core::error::GenerationError;
use delve_core::provider::{Provider, ProviderRequest, ResponseFormat};
use serde::de::DeserializeOwned;
use tracing::debug;

/// A provider bound to one model and its sampling settings.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl Generator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The same provider and settings, pointed at another model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system: &str, prompt: &str, format: ResponseFormat) -> ProviderRequest {
        let mut request = ProviderRequest::new(&self.model, system, prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request.response_format = format;
        request
    }

    /// Generate a value of type `T` matching `schema`.
    pub async fn generate_object<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<T, GenerationError> {
        let request = self.request(
            system,
            prompt,
            ResponseFormat::JsonSchema {
                name: schema_name.to_string(),
                schema,
                strict: true,
            },
        );

        let response = self.provider.complete(request).await?;
        if let Some(usage) = response.usage {
            debug!(
                schema = schema_name,
                model = %response.model,
                total_tokens = usage.total_tokens,
                "Structured generation complete"
            );
        }

        decode(schema_name, &response.message.content)
    }

    /// Generate free-form text, trimmed of surrounding whitespace.
    pub async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        let request = self.request(system, prompt, ResponseFormat::Text);
        let response = self.provider.complete(request).await?;
        debug!(model = %response.model, chars = response.message.content.len(), "Text generation complete");
        Ok(response.message.content.trim().to_string())
    }
}

fn decode<T: DeserializeOwned>(schema_name: &str, content: &str) -> Result<T, GenerationError> {
    let json = strip_code_fences(content);
    serde_json::from_str(json).map_err(|e| {
        GenerationError::Schema(format!("{schema_name}: {e}"))
    })
}

/// Strip a surrounding markdown code fence (```` ``` ```` or ```` ```json ````), if any.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
