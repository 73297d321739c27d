//! OpenAI-compatible chat-completions provider.
//!
//! Speaks the `/chat/completions` wire format, which OpenAI and most hosted
//! and local gateways accept.
//!
//! # Example
//!
//! ```ignore
//! use rehearse_models::providers::OpenAiCompatProvider;
//!
//! let provider = OpenAiCompatProvider::new("https://api.openai.com/v1", Some(key));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatRequest, ChatResponse, Message, StopReason, Usage};
use crate::auth::ApiKey;
use crate::{Error, Result};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn stop_reason(finish_reason: Option<&str>) -> StopReason {
    match finish_reason {
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

impl TryFrom<CompletionResponse> for ChatResponse {
    type Error = Error;

    fn try_from(response: CompletionResponse) -> Result<Self> {
        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(Error::EmptyResponse)?;
        Ok(Self {
            content: choice.message.content.unwrap_or_default(),
            stop_reason: stop_reason(choice.finish_reason.as_deref()),
            usage,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAiCompatProvider
// ────────────────────────────────────────────────────────────────────────────

/// Provider for any endpoint that implements `/chat/completions`.
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider for `base_url` (without the `/chat/completions` suffix).
    pub fn new(base_url: impl Into<String>, api_key: Option<ApiKey>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider whose HTTP client gives up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: Option<ApiKey>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;
        Ok(Self {
            client,
            ..Self::new(base_url, api_key)
        })
    }

    /// Get the base URL for this provider.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Perform a chat completion request.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let body = CompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stop: request.stop.as_deref(),
        };

        let mut builder = self.client.post(self.completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderApi(format!(
                "chat completions returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        completion.try_into()
    }
}

#[async_trait::async_trait]
impl super::ModelProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat(request).await
    }
}
