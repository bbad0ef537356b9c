//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, globally or per pipeline step
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_purpose_response("router", r#"{"opcao": 2, "justificativa": "saudação"}"#)
//!     .with_purpose_response("general", "Olá! Como posso ajudar?");
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Mock AI provider for testing.
///
/// Responses queued for a request's `metadata.purpose` are served first;
/// otherwise the shared queue is used, then a fixed default.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    by_purpose: Arc<Mutex<HashMap<&'static str, VecDeque<MockResponse>>>>,
    info: ProviderInfo,
    delay: Duration,
    purpose_delays: HashMap<&'static str, Duration>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

impl MockResponse {
    fn text(content: impl Into<String>) -> Self {
        MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            by_purpose: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            purpose_delays: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the shared queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.responses).push_back(MockResponse::text(content));
        self
    }

    /// Adds an error response to the shared queue.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Queues a response served only to requests issued for `purpose`.
    pub fn with_purpose_response(self, purpose: &'static str, content: impl Into<String>) -> Self {
        lock(&self.by_purpose)
            .entry(purpose)
            .or_default()
            .push_back(MockResponse::text(content));
        self
    }

    /// Queues an error served only to requests issued for `purpose`.
    pub fn with_purpose_error(self, purpose: &'static str, error: MockError) -> Self {
        lock(&self.by_purpose)
            .entry(purpose)
            .or_default()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Latency applied only to requests issued for `purpose`, in place of
    /// the shared delay.
    pub fn with_purpose_delay(mut self, purpose: &'static str, delay: Duration) -> Self {
        self.purpose_delays.insert(purpose, delay);
        self
    }

    /// Returns all requests received, in order.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of calls issued for `purpose`.
    pub fn calls_for(&self, purpose: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.metadata.purpose == purpose)
            .count()
    }

    /// Most recent request issued for `purpose`.
    pub fn last_call_for(&self, purpose: &str) -> Option<CompletionRequest> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|c| c.metadata.purpose == purpose)
            .cloned()
    }

    fn next_response(&self, purpose: &str) -> MockResponse {
        if let Some(response) = lock(&self.by_purpose)
            .get_mut(purpose)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::text("Mock response"))
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let purpose = request.metadata.purpose;
        lock(&self.calls).push(request);

        let delay = self
            .purpose_delays
            .get(purpose)
            .copied()
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        match self.next_response(purpose) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MessageRole, RequestMetadata};

    fn request_for(purpose: &'static str) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(None, purpose))
            .with_message(MessageRole::User, "Olá")
    }

    #[tokio::test]
    async fn returns_responses_in_order() {
        let provider = MockAIProvider::new().with_response("Primeira").with_response("Segunda");

        let r1 = provider.complete(request_for("x")).await.unwrap();
        let r2 = provider.complete(request_for("x")).await.unwrap();

        assert_eq!(r1.content, "Primeira");
        assert_eq!(r2.content, "Segunda");
        assert_eq!(r1.model, "mock-model-1");
    }

    #[tokio::test]
    async fn returns_default_after_exhausted() {
        let provider = MockAIProvider::new().with_response("Única");

        provider.complete(request_for("x")).await.unwrap();
        let r2 = provider.complete(request_for("x")).await.unwrap();

        assert_eq!(r2.content, "Mock response");
    }

    #[tokio::test]
    async fn purpose_queue_takes_precedence() {
        let provider = MockAIProvider::new()
            .with_response("compartilhada")
            .with_purpose_response("router", "roteador");

        let general = provider.complete(request_for("general")).await.unwrap();
        let router = provider.complete(request_for("router")).await.unwrap();

        assert_eq!(general.content, "compartilhada");
        assert_eq!(router.content, "roteador");
        assert_eq!(provider.calls_for("router"), 1);
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider = MockAIProvider::new()
            .with_purpose_error("rag", MockError::RateLimited { retry_after_secs: 30 });

        let err = provider.complete(request_for("rag")).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 30 }));
    }

    #[tokio::test]
    async fn tracks_calls() {
        let provider = MockAIProvider::new();
        assert_eq!(provider.call_count(), 0);

        provider.complete(request_for("x")).await.unwrap();
        provider.complete(request_for("y")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.calls_for("y"), 1);
        assert!(provider.last_call_for("y").is_some());
        assert!(provider.last_call_for("z").is_none());
    }

    #[tokio::test]
    async fn respects_delay() {
        let provider = MockAIProvider::new().with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.complete(request_for("x")).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn purpose_delay_applies_only_to_that_purpose() {
        let provider =
            MockAIProvider::new().with_purpose_delay("confirmation", Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.complete(request_for("router")).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));

        provider.complete(request_for("confirmation")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(provider.get_calls().len(), 2);
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        let err: AIError = MockError::AuthenticationFailed.into();
        assert!(matches!(err, AIError::AuthenticationFailed));

        let err: AIError = MockError::Timeout { timeout_secs: 30 }.into();
        assert!(matches!(err, AIError::Timeout { timeout_secs: 30 }));
    }
}
