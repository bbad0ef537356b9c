//! Knowledge domain: retrieved passages, context formatting and the
//! ingestion text splitter.

mod passage;
mod splitter;

pub use passage::{format_context, RetrievedPassage};
pub use splitter::{TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATORS};
