//! Similarity Index Port - nearest-neighbour search over embedded passages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::knowledge::RetrievedPassage;

/// How results are ranked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchMode {
    /// Plain top-k by cosine similarity.
    Similarity,
    /// Maximal marginal relevance over the `fetch_k` most similar
    /// candidates. `lambda` = 1.0 is pure relevance, 0.0 pure diversity.
    Mmr { fetch_k: usize, lambda: f32 },
}

/// A chunk ready to be stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Errors from similarity indexes.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The persisted collection does not exist.
    #[error("collection not found: {0}")]
    NotFound(String),

    #[error("embedding dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index is corrupt: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Port for the knowledge-base vector index.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Returns up to `k` passages ranked for `query`.
    ///
    /// An empty index or no candidates yields an empty vector, not an error.
    async fn search(
        &self,
        query: &[f32],
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedPassage>, IndexError>;

    /// Adds chunks; returns how many were stored.
    async fn add(&self, chunks: Vec<IndexedChunk>) -> Result<usize, IndexError>;

    /// Removes every chunk.
    async fn clear(&self) -> Result<(), IndexError>;

    /// Writes the collection to durable storage.
    async fn persist(&self) -> Result<(), IndexError>;

    /// Number of stored chunks.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
