//! KnowledgeIndexer - builds the retrieval collection from plain text.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::knowledge::TextSplitter;
use crate::ports::{EmbeddingError, EmbeddingProvider, IndexError, IndexedChunk, SimilarityIndex};

pub const DEFAULT_EMBED_BATCH: usize = 64;

/// One source document to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub source: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexingReport {
    pub documents: usize,
    pub chunks: usize,
    /// Chunks in the collection after persisting.
    pub total_chunks: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexingError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index update failed: {0}")]
    Index(#[from] IndexError),
}

pub struct KnowledgeIndexer {
    splitter: TextSplitter,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    batch_size: usize,
}

impl KnowledgeIndexer {
    pub fn new(
        splitter: TextSplitter,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
    ) -> Self {
        Self {
            splitter,
            embedder,
            index,
            batch_size: DEFAULT_EMBED_BATCH,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Splits, embeds and stores `documents`, then persists the collection.
    ///
    /// Nothing is written when the documents produce no chunks.
    pub async fn index(&self, documents: &[SourceDocument]) -> Result<IndexingReport, IndexingError> {
        let mut chunks = Vec::new();
        for document in documents {
            let pieces = self.splitter.split(&document.text);
            if pieces.is_empty() {
                warn!(source = %document.source, "Document has no text to index");
            }
            info!(source = %document.source, chunks = pieces.len(), "Split document");
            chunks.extend(pieces);
        }

        if chunks.is_empty() {
            warn!(documents = documents.len(), "Nothing to index");
            return Ok(IndexingReport {
                documents: documents.len(),
                chunks: 0,
                total_chunks: self.index.len().await,
            });
        }

        for batch in chunks.chunks(self.batch_size) {
            let embeddings = self.embedder.embed_batch(batch).await?;
            let indexed = batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(text, embedding)| IndexedChunk { text, embedding })
                .collect();
            self.index.add(indexed).await?;
        }
        self.index.persist().await?;

        let report = IndexingReport {
            documents: documents.len(),
            chunks: chunks.len(),
            total_chunks: self.index.len().await,
        };
        info!(
            documents = report.documents,
            chunks = report.chunks,
            total_chunks = report.total_chunks,
            model = self.embedder.model(),
            "Knowledge index updated"
        );
        Ok(report)
    }
}
