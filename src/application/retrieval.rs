//! RetrievalEngine - diversified search with a single similarity fallback.

use std::sync::Arc;

use tracing::debug;

use crate::domain::knowledge::{format_context, RetrievedPassage};
use crate::ports::{EmbeddingError, EmbeddingProvider, IndexError, SearchMode, SimilarityIndex};

pub const DEFAULT_K: usize = 12;
pub const DEFAULT_FETCH_K: usize = 36;
pub const DEFAULT_MMR_LAMBDA: f32 = 0.5;

/// Search sizes for one retrieval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalSettings {
    pub k: usize,
    pub fetch_k: usize,
    pub lambda: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            fetch_k: DEFAULT_FETCH_K,
            lambda: DEFAULT_MMR_LAMBDA,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index search failed: {0}")]
    Index(#[from] IndexError),
}

pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    settings: RetrievalSettings,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            settings,
        }
    }

    pub fn settings(&self) -> RetrievalSettings {
        self.settings
    }

    /// Ranked passages for `query`.
    ///
    /// Runs MMR first; only an empty MMR result triggers the plain
    /// similarity search, and that happens at most once. An empty result is
    /// not an error.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let vector = self.embedder.embed(query).await?;

        let primary = self
            .index
            .search(
                &vector,
                self.settings.k,
                SearchMode::Mmr {
                    fetch_k: self.settings.fetch_k,
                    lambda: self.settings.lambda,
                },
            )
            .await?;
        if !primary.is_empty() {
            debug!(passages = primary.len(), "MMR retrieval");
            return Ok(primary);
        }

        let fallback = self
            .index
            .search(&vector, self.settings.k, SearchMode::Similarity)
            .await?;
        debug!(passages = fallback.len(), "MMR empty, similarity fallback");
        Ok(fallback)
    }

    /// Passages joined into the context block handed to the synthesizer.
    pub async fn context(&self, query: &str) -> Result<String, RetrievalError> {
        let passages = self.retrieve(query).await?;
        Ok(format_context(&passages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockEmbeddingProvider;
    use crate::ports::IndexedChunk;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Index double that records the modes it was searched with.
    struct ScriptedIndex {
        mmr: Vec<RetrievedPassage>,
        similarity: Vec<RetrievedPassage>,
        modes: Mutex<Vec<SearchMode>>,
    }

    impl ScriptedIndex {
        fn new(mmr: Vec<&str>, similarity: Vec<&str>) -> Self {
            Self {
                mmr: mmr.into_iter().map(RetrievedPassage::new).collect(),
                similarity: similarity.into_iter().map(RetrievedPassage::new).collect(),
                modes: Mutex::new(Vec::new()),
            }
        }

        fn modes(&self) -> Vec<SearchMode> {
            self.modes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SimilarityIndex for ScriptedIndex {
        async fn search(
            &self,
            _query: &[f32],
            _k: usize,
            mode: SearchMode,
        ) -> Result<Vec<RetrievedPassage>, IndexError> {
            self.modes.lock().unwrap().push(mode);
            Ok(match mode {
                SearchMode::Mmr { .. } => self.mmr.clone(),
                SearchMode::Similarity => self.similarity.clone(),
            })
        }

        async fn add(&self, chunks: Vec<IndexedChunk>) -> Result<usize, IndexError> {
            Ok(chunks.len())
        }

        async fn clear(&self) -> Result<(), IndexError> {
            Ok(())
        }

        async fn persist(&self) -> Result<(), IndexError> {
            Ok(())
        }

        async fn len(&self) -> usize {
            self.mmr.len()
        }
    }

    fn engine(index: Arc<ScriptedIndex>) -> RetrievalEngine {
        RetrievalEngine::new(
            Arc::new(MockEmbeddingProvider::default()),
            index,
            RetrievalSettings::default(),
        )
    }

    #[tokio::test]
    async fn uses_mmr_result_when_present() {
        let index = Arc::new(ScriptedIndex::new(vec!["febre alta"], vec!["não usado"]));
        let passages = engine(index.clone()).retrieve("febre").await.unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "febre alta");
        assert_eq!(
            index.modes(),
            vec![SearchMode::Mmr {
                fetch_k: 36,
                lambda: 0.5
            }]
        );
    }

    #[tokio::test]
    async fn falls_back_to_similarity_exactly_once() {
        let index = Arc::new(ScriptedIndex::new(vec![], vec!["manchas vermelhas"]));
        let passages = engine(index.clone()).retrieve("manchas").await.unwrap();

        assert_eq!(passages[0].text, "manchas vermelhas");
        let modes = index.modes();
        assert_eq!(modes.len(), 2);
        assert!(matches!(modes[0], SearchMode::Mmr { .. }));
        assert_eq!(modes[1], SearchMode::Similarity);
    }

    #[tokio::test]
    async fn empty_fallback_is_not_an_error() {
        let index = Arc::new(ScriptedIndex::new(vec![], vec![]));
        let passages = engine(index.clone()).retrieve("nada").await.unwrap();

        assert!(passages.is_empty());
        assert_eq!(index.modes().len(), 2);
    }

    #[tokio::test]
    async fn context_joins_passages_in_rank_order() {
        let index = Arc::new(ScriptedIndex::new(vec!["  primeiro ", "", "segundo"], vec![]));
        let context = engine(index).context("dengue").await.unwrap();
        assert_eq!(context, "primeiro\n\nsegundo");
    }
}
