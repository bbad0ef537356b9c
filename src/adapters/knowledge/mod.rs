//! Knowledge adapters - SimilarityIndex implementations.

mod file_vector_index;

pub use file_vector_index::FileVectorIndex;
