//! Passages returned by the similarity index.

use serde::{Deserialize, Serialize};

/// One ranked chunk of the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    /// Similarity to the query, when the index reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Joins passages in ranking order into one context block.
///
/// Each passage is trimmed, blank ones are skipped, and the rest are
/// separated by a blank line.
pub fn format_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
