//! File-backed similarity index.
//!
//! Chunks and their embeddings live in memory and are searched by brute-force
//! cosine similarity. The collection is stored as one JSON document at
//! `<index_dir>/<collection>.json`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::knowledge::RetrievedPassage;
use crate::ports::{IndexError, IndexedChunk, SearchMode, SimilarityIndex};

/// On-disk layout of a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
    name: String,
    /// Embedding model used to build the collection.
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    dimension: Option<usize>,
    chunks: Vec<IndexedChunk>,
}

#[derive(Debug)]
pub struct FileVectorIndex {
    path: PathBuf,
    collection: RwLock<Collection>,
}

impl FileVectorIndex {
    fn collection_path(index_dir: &Path, name: &str) -> PathBuf {
        index_dir.join(format!("{}.json", name))
    }

    /// Loads an existing collection.
    ///
    /// # Errors
    /// `IndexError::NotFound` when the collection file does not exist.
    pub async fn open<P: AsRef<Path>>(index_dir: P, name: &str) -> Result<Self, IndexError> {
        let path = Self::collection_path(index_dir.as_ref(), name);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(IndexError::NotFound(path.display().to_string()));
        }

        let raw = fs::read_to_string(&path)
            .await
            .map_err(|e| IndexError::Io(e.to_string()))?;
        let collection: Collection =
            serde_json::from_str(&raw).map_err(|e| IndexError::Corrupt(e.to_string()))?;

        tracing::info!(
            collection = %collection.name,
            chunks = collection.chunks.len(),
            path = %path.display(),
            "opened knowledge index"
        );
        Ok(Self {
            path,
            collection: RwLock::new(collection),
        })
    }

    /// Starts an empty collection; nothing is written until `persist`.
    pub fn create<P: AsRef<Path>>(index_dir: P, name: &str) -> Self {
        Self {
            path: Self::collection_path(index_dir.as_ref(), name),
            collection: RwLock::new(Collection {
                name: name.to_string(),
                ..Collection::default()
            }),
        }
    }

    /// Opens the collection if present, otherwise starts an empty one.
    pub async fn open_or_create<P: AsRef<Path>>(index_dir: P, name: &str) -> Result<Self, IndexError> {
        match Self::open(index_dir.as_ref(), name).await {
            Err(IndexError::NotFound(_)) => Ok(Self::create(index_dir, name)),
            other => other,
        }
    }

    /// Records the embedding model the collection is built with.
    pub async fn set_model(&self, model: impl Into<String>) {
        self.collection.write().await.model = Some(model.into());
    }

    pub async fn model(&self) -> Option<String> {
        self.collection.read().await.model.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SimilarityIndex for FileVectorIndex {
    async fn search(
        &self,
        query: &[f32],
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedPassage>, IndexError> {
        let collection = self.collection.read().await;
        if k == 0 || collection.chunks.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = collection.dimension {
            if query.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let ranked = rank(query, &collection.chunks);
        let picked = match mode {
            SearchMode::Similarity => ranked.into_iter().take(k).collect::<Vec<_>>(),
            SearchMode::Mmr { fetch_k, lambda } => {
                let candidates: Vec<_> = ranked.into_iter().take(fetch_k.max(k)).collect();
                mmr_select(&candidates, &collection.chunks, k, lambda)
            }
        };

        Ok(picked
            .into_iter()
            .map(|(idx, score)| {
                RetrievedPassage::new(collection.chunks[idx].text.clone()).with_score(score)
            })
            .collect())
    }

    async fn add(&self, chunks: Vec<IndexedChunk>) -> Result<usize, IndexError> {
        let mut collection = self.collection.write().await;
        let Some(expected) = collection
            .dimension
            .or_else(|| chunks.first().map(|c| c.embedding.len()))
        else {
            return Ok(0);
        };
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != expected) {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: bad.embedding.len(),
            });
        }
        collection.dimension = Some(expected);
        let added = chunks.len();
        collection.chunks.extend(chunks);
        Ok(added)
    }

    async fn clear(&self) -> Result<(), IndexError> {
        let mut collection = self.collection.write().await;
        collection.chunks.clear();
        collection.dimension = None;
        Ok(())
    }

    async fn persist(&self) -> Result<(), IndexError> {
        let collection = self.collection.read().await;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| IndexError::Io(e.to_string()))?;
        }

        let json =
            serde_json::to_string(&*collection).map_err(|e| IndexError::Corrupt(e.to_string()))?;

        // Write-then-rename so readers never see a half-written collection.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| IndexError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| IndexError::Io(e.to_string()))?;

        tracing::info!(chunks = collection.chunks.len(), path = %self.path.display(), "persisted knowledge index");
        Ok(())
    }

    async fn len(&self) -> usize {
        self.collection.read().await.chunks.len()
    }
}

/// All chunk indices ordered by descending similarity to `query`.
fn rank(query: &[f32], chunks: &[IndexedChunk]) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| (i, cosine_similarity(query, &c.embedding)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}

/// Greedy maximal-marginal-relevance selection.
///
/// Each step picks the candidate maximising
/// `lambda * sim(query, d) - (1 - lambda) * max(sim(d, s) for s in selected)`.
fn mmr_select(
    candidates: &[(usize, f32)],
    chunks: &[IndexedChunk],
    k: usize,
    lambda: f32,
) -> Vec<(usize, f32)> {
    let mut remaining: Vec<(usize, f32)> = candidates.to_vec();
    let mut selected: Vec<(usize, f32)> = Vec::with_capacity(k.min(candidates.len()));

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, (idx, relevance)) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|(s, _)| cosine_similarity(&chunks[*idx].embedding, &chunks[*s].embedding))
                .reduce(f32::max)
                .unwrap_or(0.0);
            let score = lambda * relevance - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        selected.push(remaining.remove(best_pos));
    }

    selected
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chunk(text: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            text: text.to_string(),
            embedding,
        }
    }

    async fn sample_index(dir: &Path) -> FileVectorIndex {
        let index = FileVectorIndex::create(dir, "dengue");
        index
            .add(vec![
                chunk("febre alta", vec![1.0, 0.5, 0.0]),
                chunk("febre alta (cópia)", vec![1.0, 0.55, 0.0]),
                chunk("dor nas articulações", vec![1.0, -0.6, 0.0]),
                chunk("mosquito", vec![0.0, 0.0, 1.0]),
            ])
            .await
            .unwrap();
        index
    }

    #[tokio::test]
    async fn open_missing_collection_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = FileVectorIndex::open(dir.path(), "dengue").await;
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[tokio::test]
    async fn similarity_returns_top_k_by_score() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(dir.path()).await;

        let hits = index.search(&[1.0, 0.0, 0.0], 2, SearchMode::Similarity).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "febre alta");
        assert_eq!(hits[1].text, "febre alta (cópia)");
    }

    #[tokio::test]
    async fn mmr_prefers_diverse_results() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(dir.path()).await;

        let hits = index
            .search(&[1.0, 0.0, 0.0], 2, SearchMode::Mmr { fetch_k: 4, lambda: 0.5 })
            .await
            .unwrap();

        assert_eq!(hits[0].text, "febre alta");
        assert_eq!(hits[1].text, "dor nas articulações");
    }

    #[tokio::test]
    async fn mmr_with_lambda_one_matches_similarity() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(dir.path()).await;
        let query = [0.8, 0.2, 0.0];

        let mmr = index
            .search(&query, 3, SearchMode::Mmr { fetch_k: 4, lambda: 1.0 })
            .await
            .unwrap();
        let plain = index.search(&query, 3, SearchMode::Similarity).await.unwrap();

        let texts = |v: &[RetrievedPassage]| v.iter().map(|p| p.text.clone()).collect::<Vec<_>>();
        assert_eq!(texts(&mmr), texts(&plain));
    }

    #[tokio::test]
    async fn empty_index_returns_nothing() {
        let dir = TempDir::new().unwrap();
        let index = FileVectorIndex::create(dir.path(), "dengue");
        let hits = index.search(&[1.0], 12, SearchMode::Similarity).await.unwrap();
        assert!(hits.is_empty());
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn rejects_mismatched_dimensions() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(dir.path()).await;

        let add = index.add(vec![chunk("x", vec![1.0])]).await;
        assert!(matches!(add, Err(IndexError::DimensionMismatch { expected: 3, actual: 1 })));

        let search = index.search(&[1.0, 0.0], 1, SearchMode::Similarity).await;
        assert!(matches!(search, Err(IndexError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn rejected_first_batch_leaves_dimension_unset() {
        let dir = TempDir::new().unwrap();
        let index = FileVectorIndex::create(dir.path(), "dengue");

        let add = index
            .add(vec![chunk("a", vec![1.0, 0.0, 0.0]), chunk("b", vec![1.0])])
            .await;
        assert!(matches!(add, Err(IndexError::DimensionMismatch { expected: 3, actual: 1 })));
        assert!(index.is_empty().await);

        assert_eq!(index.add(vec![chunk("c", vec![0.5, 0.5])]).await.unwrap(), 1);
    }

    #[test]
    fn mmr_counts_negative_redundancy() {
        let chunks = vec![
            chunk("a", vec![1.0, 0.0]),
            chunk("b", vec![-0.9, 0.19f32.sqrt()]),
            chunk("c", vec![-0.2, 0.96f32.sqrt()]),
        ];
        let candidates = [(0, 0.9), (1, 0.5), (2, 0.6)];

        let picked = mmr_select(&candidates, &chunks, 2, 0.5);

        // b is further from a than c is, which outweighs its lower relevance.
        let order: Vec<usize> = picked.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[tokio::test]
    async fn persist_and_reopen_round_trip() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(dir.path()).await;
        index.set_model("text-embedding-004").await;
        index.persist().await.unwrap();

        let reopened = FileVectorIndex::open(dir.path(), "dengue").await.unwrap();
        assert_eq!(reopened.len().await, 4);
        assert_eq!(reopened.model().await.as_deref(), Some("text-embedding-004"));
        assert!(dir.path().join("dengue.json").exists());
    }

    #[tokio::test]
    async fn clear_empties_collection() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(dir.path()).await;
        index.clear().await.unwrap();
        assert_eq!(index.len().await, 0);
        index.add(vec![chunk("novo", vec![1.0])]).await.unwrap();
        assert_eq!(index.len().await, 1);
    }

    #[test]
    fn cosine_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }
}
