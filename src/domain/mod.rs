//! Domain layer containing the assistant's pure logic and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `conversation` - Turns, sessions and the retention window
//! - `routing` - Intents and classification results
//! - `triage` - Symptom and alarm-sign detection
//! - `knowledge` - Retrieved passages and the ingestion splitter
//! - `intake` - Intake record, draft and registration state machine

pub mod conversation;
pub mod foundation;
pub mod intake;
pub mod knowledge;
pub mod routing;
pub mod triage;
