//! EmbeddingProvider implementations.
//!
//! - `OpenAIEmbeddingProvider` calls an OpenAI-compatible `/embeddings`
//!   endpoint (Gemini's by default).
//! - `MockEmbeddingProvider` is a deterministic hashed bag-of-words embedder
//!   for tests and offline runs.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::openai_provider::{
    build_client, check_status, transport_error, with_retries, DEFAULT_BASE_URL,
};
use crate::ports::{AIError, EmbeddingError, EmbeddingProvider};

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Inputs sent per `/embeddings` request.
const MAX_BATCH: usize = 100;

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl EmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
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
}

pub struct OpenAIEmbeddingProvider {
    config: EmbeddingConfig,
    client: Client,
}

impl OpenAIEmbeddingProvider {
    /// Fails with `MissingApiKey` when the configured key is blank.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(EmbeddingError::MissingApiKey);
        }
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AIError> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: inputs,
            })
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.timeout))?;

        let response = check_status(response).await?;
        let mut body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse embeddings: {}", e)))?;

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            let embedded = with_retries(self.config.max_retries, || self.request(batch)).await?;
            if embedded.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    actual: embedded.len(),
                });
            }
            vectors.extend(embedded);
        }
        tracing::debug!(count = vectors.len(), model = %self.config.model, "embedded texts");
        Ok(vectors)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Deterministic embedder: lowercased word tokens hashed into a fixed
/// number of buckets, L2-normalised.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

impl MockEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(&token.to_lowercase()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn model(&self) -> &str {
        "mock-bow"
    }
}
