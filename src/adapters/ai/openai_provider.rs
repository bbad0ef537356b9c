//! OpenAI-compatible Provider - Implementation of AIProvider for any
//! `/chat/completions` endpoint.
//!
//! Defaults target Gemini through its OpenAI-compatible surface; pointing
//! `base_url` at another compatible server (OpenAI, a local gateway) needs
//! no code change.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API, without trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Builds the shared HTTP client with the configured timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, AIError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AIError::InvalidRequest(format!("failed to create HTTP client: {}", e)))
}

/// Maps a transport failure to the port's error type.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Passes successful responses through and maps error statuses.
pub(crate) async fn check_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(AIError::AuthenticationFailed),
        429 => Err(AIError::rate_limited(parse_retry_after(&error_body))),
        400 => Err(AIError::InvalidRequest(error_body)),
        500..=599 => Err(AIError::unavailable(format!(
            "Server error {}: {}",
            status, error_body
        ))),
        _ => Err(AIError::network(format!(
            "Unexpected status {}: {}",
            status, error_body
        ))),
    }
}

/// Parses retry-after from an error body, defaulting to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    if let Some(msg) = message {
        for marker in ["try again in ", "retry in "] {
            if let Some(idx) = msg.find(marker) {
                let rest = &msg[idx + marker.len()..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
    }
    30
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error or
/// exhausts `max_retries`, backing off exponentially (1s, 2s, 4s, ...).
pub(crate) async fn with_retries<T, F, Fut>(max_retries: u32, mut attempt: F) -> Result<T, AIError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AIError>>,
{
    let mut retry_count = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || retry_count >= max_retries {
                    return Err(err);
                }
                tracing::warn!(error = %err, retry = retry_count + 1, "retrying provider call");
                sleep(Duration::from_secs(1 << retry_count.min(5))).await;
                retry_count += 1;
            }
        }
    }
}

/// OpenAI-compatible chat completion provider.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our request to the wire format.
    fn to_wire_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(prompt.clone()),
            });
        }

        for msg in &request.messages {
            messages.push(ChatMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: Some(msg.content.clone()),
            });
        }

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.timeout))?;

        let response = check_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        parse_chat_response(body, &self.config.model)
    }
}

fn parse_chat_response(body: ChatResponse, fallback_model: &str) -> Result<CompletionResponse, AIError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AIError::parse("No choices in response"))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    };

    let content = match choice.message.content {
        Some(content) => content,
        None if finish_reason == FinishReason::ContentFilter => {
            return Err(AIError::content_filtered("response blocked by provider"))
        }
        None => String::new(),
    };

    let usage = body
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage,
        model: body.model.unwrap_or_else(|| fallback_model.to_string()),
        finish_reason,
    })
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        tracing::debug!(
            purpose = request.metadata.purpose,
            trace_id = %request.metadata.trace_id,
            messages = request.messages.len(),
            "sending completion request"
        );
        with_retries(self.config.max_retries, || self.attempt(&request)).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai-compatible", &self.config.model)
    }
}

// ----- Wire Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
