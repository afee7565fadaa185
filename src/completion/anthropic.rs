//! Anthropic messages API client.

use super::{CompletionRequest, CompletionResponse, CompletionService, ContentBlock, StopReason};
use crate::config::CompletionSettings;
use crate::error::{PensumError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Completion service backed by the Anthropic messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClient {
    /// Create a client from settings. The API key is read from the
    /// `ANTHROPIC_API_KEY` environment variable.
    pub fn new(settings: &CompletionSettings) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| PensumError::Config("ANTHROPIC_API_KEY is not set".to_string()))?;
        Self::with_api_key(settings, api_key)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(settings: &CompletionSettings, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

/// Request body for the messages endpoint.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(flatten)]
    request: &'a CompletionRequest,
}

/// Response body from the messages endpoint. Fields the orchestration
/// does not consume (id, usage, model) are ignored.
#[derive(Deserialize)]
struct MessagesResponse {
    stop_reason: StopReason,
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %self.model, messages = request.messages.len(), "Sending completion request");

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            request: &request,
        };

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(PensumError::Completion(format!(
                "API request failed ({}): {}",
                status, message
            )));
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(CompletionResponse {
            stop_reason: parsed.stop_reason,
            content: parsed.content,
        })
    }
}
