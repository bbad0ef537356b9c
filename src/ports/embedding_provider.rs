//! Embedding Provider Port - text to vector.
//!
//! Used when the knowledge base is indexed and once per query at
//! retrieval time. Both sides must use the same model.

use async_trait::async_trait;

use super::AIError;

/// Errors from embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// No credential configured; raised at construction.
    #[error("embedding API key is not configured")]
    MissingApiKey,

    #[error("nothing to embed")]
    EmptyInput,

    #[error("provider returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Provider(#[from] AIError),
}

/// Port for embedding text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds several texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Model identifier (recorded alongside a persisted index).
    fn model(&self) -> &str;
}
