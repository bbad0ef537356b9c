//! Knowledge base (retrieval index) configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the index lives and how it is searched and built
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding persisted collections
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Passages returned per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// MMR candidate pool size
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// MMR relevance/diversity balance
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f32,

    /// Maximum characters per indexed chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl KnowledgeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.k == 0 || self.k > self.fetch_k {
            return Err(ValidationError::InvalidRetrievalSize);
        }
        if !(0.0..=1.0).contains(&self.mmr_lambda) {
            return Err(ValidationError::InvalidMmrLambda);
        }
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ValidationError::InvalidChunking);
        }
        if self.collection.trim().is_empty() {
            return Err(ValidationError::MissingRequired("knowledge.collection"));
        }
        Ok(())
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            collection: default_collection(),
            k: default_k(),
            fetch_k: default_fetch_k(),
            mmr_lambda: default_mmr_lambda(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("db_dengue")
}

fn default_collection() -> String {
    "dengue".to_string()
}

fn default_k() -> usize {
    12
}

fn default_fetch_k() -> usize {
    36
}

fn default_mmr_lambda() -> f32 {
    0.5
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = KnowledgeConfig::default();
        assert_eq!(config.k, 12);
        assert_eq!(config.fetch_k, 36);
        assert_eq!(config.index_dir, PathBuf::from("db_dengue"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_k_larger_than_pool_is_rejected() {
        let config = KnowledgeConfig {
            k: 40,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRetrievalSize));
    }

    #[test]
    fn test_lambda_out_of_range_is_rejected() {
        let config = KnowledgeConfig {
            mmr_lambda: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMmrLambda));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let config = KnowledgeConfig {
            chunk_overlap: 1000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidChunking));
    }
}
