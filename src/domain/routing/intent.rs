//! Intent values produced by the router.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three handling strategies a message can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Dengue questions answered from the knowledge base.
    MedicalQa,
    /// Greetings, thanks and off-topic chit-chat.
    General,
    /// Name/age registration form.
    Intake,
}

impl Intent {
    /// Maps the classifier's numeric option (1, 2, 3) to an intent.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Intent::MedicalQa),
            2 => Some(Intent::General),
            3 => Some(Intent::Intake),
            _ => None,
        }
    }

    /// Maps a classifier option, defaulting out-of-range values to General.
    pub fn from_code_or_general(code: i64) -> Self {
        Self::from_code(code).unwrap_or(Intent::General)
    }

    /// Numeric option used in classifier prompts.
    pub fn code(&self) -> u8 {
        match self {
            Intent::MedicalQa => 1,
            Intent::General => 2,
            Intent::Intake => 3,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::MedicalQa => "medical_qa",
            Intent::General => "general",
            Intent::Intake => "intake",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub rationale: String,
}

impl ClassificationResult {
    pub fn new(intent: Intent, rationale: impl Into<String>) -> Self {
        Self {
            intent,
            rationale: rationale.into(),
        }
    }

    /// Result used when the classifier output could not be understood.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::new(Intent::General, reason)
    }
}
