//! Application layer - services that combine domain logic with ports.
//!
//! The orchestrator is the single entry point for chat turns; the other
//! services are the strategies it dispatches to.

pub mod answer;
pub mod general;
pub mod indexer;
pub mod intake;
pub mod orchestrator;
pub mod prompts;
pub mod retrieval;
pub mod router;

pub use answer::{AnswerError, MedicalAnswerer, RagAnswerer};
pub use general::GeneralResponder;
pub use indexer::{IndexingError, IndexingReport, KnowledgeIndexer, SourceDocument};
pub use intake::{IntakeError, IntakeOutcome, IntakeService};
pub use orchestrator::{ChatError, ChatOrchestrator, ChatReply, OrchestratorSettings};
pub use retrieval::{RetrievalEngine, RetrievalError, RetrievalSettings};
pub use router::IntentRouter;
