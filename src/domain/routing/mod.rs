//! Routing domain: the intent vocabulary shared by the router and the orchestrator.

mod intent;

pub use intent::{ClassificationResult, Intent};
