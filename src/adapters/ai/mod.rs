//! AI adapters - Implementations of the oracle ports.
//!
//! - `OpenAIProvider` / `MockAIProvider` - text completion
//! - `LlmIntentOracle` / `LlmIntakeOracle` - constrained JSON calls on top of a provider
//! - `OpenAIEmbeddingProvider` / `MockEmbeddingProvider` - embeddings

mod embeddings;
mod intake_oracle;
mod intent_oracle;
mod mock_provider;
mod openai_provider;

pub use embeddings::{
    EmbeddingConfig, MockEmbeddingProvider, OpenAIEmbeddingProvider, DEFAULT_EMBEDDING_MODEL,
};
pub use intake_oracle::LlmIntakeOracle;
pub use intent_oracle::LlmIntentOracle;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL};
