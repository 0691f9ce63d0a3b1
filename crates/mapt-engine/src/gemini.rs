//! Gemini completion provider over the REST `generateContent` endpoint.
//!
//! Request/response, not streamed — one assessment is one call. Auth is the
//! API key as a query parameter. The structured variant constrains output
//! via `responseMimeType`/`responseSchema` and decodes the returned text
//! into the assessment shape. No internal retry: transport and decode
//! failures propagate to the pipeline's layered fallback.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use mapt_core::{AssessmentResult, text::preview};
use mapt_settings::{AssessmentSettings, ModelSettings};

use crate::provider::{Completion, CompletionError};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Byte cap for provider error text carried in [`CompletionError::Api`].
const ERROR_BODY_PREVIEW: usize = 256;

/// Resolved Gemini provider configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// API key (resolved by the composition root, not probed here).
    pub api_key: String,
    /// API host, overridable for tests and proxies.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Build a config from settings plus a resolved API key.
    pub fn from_settings(
        model: &ModelSettings,
        assessment: &AssessmentSettings,
        api_key: String,
    ) -> Self {
        Self {
            model: model.model.clone(),
            temperature: model.temperature,
            api_key,
            base_url: model
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(assessment.timeout_secs),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Gemini LLM provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: GeminiConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::ClientBuild(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Create a provider with a shared HTTP client.
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the request body; `schema` switches on constrained JSON output.
    fn request_body(&self, prompt: &str, schema: Option<&Value>) -> Value {
        let mut generation_config = json!({ "temperature": self.config.temperature });
        if let Some(schema) = schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        })
    }

    /// Issue one `generateContent` call and concatenate candidate text.
    async fn generate(&self, body: Value) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: preview(&message, ERROR_BODY_PREVIEW),
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let text: String = value["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CompletionError::Empty);
        }
        debug!(model = %self.config.model, bytes = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl Completion for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.generate(self.request_body(prompt, None)).await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<AssessmentResult, CompletionError> {
        let text = self.generate(self.request_body(prompt, Some(schema))).await?;
        serde_json::from_str(text.trim()).map_err(|e| CompletionError::Decode(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
