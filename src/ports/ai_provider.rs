//! AI Provider Port - text-completion oracle.
//!
//! Every generative step of the assistant (classification, intake extraction,
//! grounded answers, small talk, registration confirmations) goes through this
//! single request/response shape. Providers translate it to their own wire
//! format.
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new(RequestMetadata::for_session(&session_id, "router"))
//!     .with_system_prompt(CLASSIFIER_PROMPT)
//!     .with_message(MessageRole::User, text)
//!     .with_temperature(0.0)
//!     .with_max_tokens(200);
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;

/// Text-completion oracle shared by every generative step.
#[async_trait]
pub trait AIProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Name and model, for startup logs.
    fn provider_info(&self) -> ProviderInfo;
}

/// One completion call: system prompt, ordered turns and sampling knobs.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Rendered history first, current user message last.
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    /// `Some(0.0)` for classification and extraction.
    pub temperature: Option<f32>,
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            metadata,
        }
    }

    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Who asked, and why; drives log fields and mock routing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Session the request serves, when there is one (the indexer has none).
    pub session_id: Option<SessionId>,
    /// Pipeline step issuing the call ("router", "rag", "intake", ...).
    pub purpose: &'static str,
    /// Fresh UUID per call, logged by providers.
    pub trace_id: String,
}

impl RequestMetadata {
    pub fn new(session_id: Option<SessionId>, purpose: &'static str) -> Self {
        Self {
            session_id,
            purpose,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn for_session(session_id: &SessionId, purpose: &'static str) -> Self {
        Self::new(Some(session_id.clone()), purpose)
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
    /// Model reported by the provider, which may differ from the one requested.
    pub model: String,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Completion failures. Only transient ones are retried by providers.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Blocked by the provider's safety filter.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// Unreadable response body.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Rate limits, 5xx, transport errors and timeouts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}
