//! Conversation domain module.
//!
//! Turn history with a bounded retention window, plus helpers for
//! reading structured answers out of oracle output.

mod extractor;
mod session;
mod turn;

pub use extractor::{ExtractionError, JsonExtractor};
pub use session::{retention_window, Session, DEFAULT_RETENTION_PAIRS};
pub use turn::{render_history, Turn, TurnRole};
