//! HTTP completion client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use advisor_types::CompletionSettings;

use super::extract::extract_answer;
use super::{CompletionClient, CompletionError};

/// Configuration for the HTTP completion client.
#[derive(Debug, Clone)]
pub struct ApiCompletionConfig {
    /// Endpoint receiving the generation request
    pub endpoint: String,

    /// Bearer token
    pub api_key: SecretString,

    /// Target model identifier (e.g., "claude-3-5-sonnet-20241022")
    pub model: String,

    /// Token budget for one reply
    pub max_tokens: u32,

    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiCompletionConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let defaults = CompletionSettings::default();
        Self {
            endpoint: endpoint.into(),
            api_key: SecretString::from(api_key.into()),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            timeout: Duration::from_secs(defaults.timeout_secs),
        }
    }

    /// Build from loaded settings. Endpoint and API key are required.
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self, CompletionError> {
        let endpoint = settings
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| CompletionError::Config("completion.endpoint is not set".to_string()))?;
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| CompletionError::Config("completion.api_key is not set".to_string()))?;

        Ok(Self {
            endpoint,
            api_key: SecretString::from(api_key),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

/// Completion client for the generation endpoint.
///
/// One attempt per call; a failed attempt is final for the turn.
pub struct ApiCompletionClient {
    client: Client,
    config: ApiCompletionConfig,
}

impl ApiCompletionClient {
    pub fn new(config: ApiCompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

fn map_send_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Request(e.to_string())
    }
}

#[async_trait]
impl CompletionClient for ApiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            prompt,
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "Calling completion API");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Parse(e.to_string())
            }
        })?;

        extract_answer(&body).ok_or(CompletionError::EmptyAnswer)
    }
}
