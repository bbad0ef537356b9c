//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Identifier of a chat session.
///
/// Opaque to the assistant: front-ends may pass any non-blank string
/// (a browser tab id, a messaging-platform chat id...). When none is
/// supplied a random UUID is minted with [`SessionId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a SessionId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Blank { field: "session_id" });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Creates a new random SessionId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_rejects_blank() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
    }

    #[test]
    fn session_id_trims_surrounding_whitespace() {
        let id = SessionId::new("  chat-42 ").unwrap();
        assert_eq!(id.as_str(), "chat-42");
    }

    #[test]
    fn generated_session_ids_are_unique_uuids() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn session_id_parses_from_str() {
        let id: SessionId = "default".parse().unwrap();
        assert_eq!(id.to_string(), "default");
    }

    #[test]
    fn session_id_serializes_transparently() {
        let id = SessionId::new("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
