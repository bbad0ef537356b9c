//! Recursive character splitter used when ingesting knowledge text.
//!
//! Text is cut on the coarsest separator that occurs in it; pieces still
//! longer than the chunk size are split again with the finer separators.
//! Adjacent small pieces are merged back into chunks of at most
//! `chunk_size` characters, with roughly `chunk_overlap` characters
//! repeated between consecutive chunks. Separators stay attached to the
//! start of the piece that follows them.

use crate::domain::foundation::ValidationError;

/// Separators tried in order, coarsest first. The empty separator splits
/// into single characters.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ".", " ", ""];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TextSplitter {
    /// Creates a splitter with the default separators.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ValidationError> {
        if chunk_size == 0 {
            return Err(ValidationError::OutOfRange {
                field: "chunk_size",
                min: 1,
                max: usize::MAX,
                actual: 0,
            });
        }
        if chunk_overlap >= chunk_size {
            return Err(ValidationError::OutOfRange {
                field: "chunk_overlap",
                min: 0,
                max: chunk_size - 1,
                actual: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);
        let pieces = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut small = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }
        chunks.retain(|c| !c.is_empty());
        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &window);
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    let first = window.remove(0);
                    total -= char_len(first);
                }
            }
            window.push(piece);
            total += len;
        }
        push_trimmed(&mut chunks, &window);
        chunks
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep.as_str()) {
            return (sep.as_str(), &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn push_trimmed(chunks: &mut Vec<String>, window: &[&str]) {
    let joined: String = window.concat();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 10).is_ok());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split("  A dengue é uma doença viral.  "), vec!["A dengue é uma doença viral."]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(TextSplitter::default().split(" \n\n ").is_empty());
    }

    #[test]
    fn chunks_respect_size_limit() {
        let splitter = TextSplitter::new(50, 10).unwrap();
        let text = "Febre alta. Dor de cabeça. Dor atrás dos olhos. Manchas vermelhas. \
                    Náuseas e vômitos. Cansaço intenso. Perda de apetite.\n\n\
                    Sinais de alarme exigem avaliação imediata.";
        let chunks = splitter.split(text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(30, 0).unwrap();
        let chunks = splitter.split("Primeiro parágrafo curto.\n\nSegundo parágrafo curto.");
        assert_eq!(chunks, vec!["Primeiro parágrafo curto.", "Segundo parágrafo curto."]);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let splitter = TextSplitter::new(20, 8).unwrap();
        let chunks = splitter.split("um dois tres quatro cinco seis sete oito nove dez");
        assert!(chunks.len() >= 2);
        let last_word_of_first = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].contains(last_word_of_first));
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let splitter = TextSplitter::new(10, 0).unwrap();
        let chunks = splitter.split(&"a".repeat(25));
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }
}
