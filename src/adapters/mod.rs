//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI-compatible chat and embedding clients, LLM-backed oracles, mocks
//! - `knowledge` - File-backed similarity index
//! - `storage` - Session and intake stores
//! - `http` - Axum REST API

pub mod ai;
pub mod http;
pub mod knowledge;
pub mod storage;
