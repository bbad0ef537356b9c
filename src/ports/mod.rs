//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Oracle Ports
//!
//! - `AIProvider` - Text completion
//! - `IntentOracle` - Message classification
//! - `IntakeOracle` - Structured intake extraction
//! - `EmbeddingProvider` - Text embeddings
//!
//! ## Storage Ports
//!
//! - `SimilarityIndex` - Knowledge-base vector index
//! - `SessionStore` - Conversation history and intake draft
//! - `IntakeStore` - Append-only registrations

mod ai_provider;
mod embedding_provider;
mod intake_oracle;
mod intake_store;
mod intent_oracle;
mod session_store;
mod similarity_index;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use embedding_provider::{EmbeddingError, EmbeddingProvider};
pub use intake_oracle::IntakeOracle;
pub use intake_store::{IntakeStore, IntakeStoreError};
pub use intent_oracle::{IntentOracle, RoutingError};
pub use session_store::{SessionStore, SessionStoreError};
pub use similarity_index::{IndexError, IndexedChunk, SearchMode, SimilarityIndex};
