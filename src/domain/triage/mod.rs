//! Triage domain: symptom / alarm-sign detection and the resulting call-to-action.

mod detector;

pub use detector::{CallToAction, Detection, SymptomDetector};
