//! Conversation turns.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Label used when rendering history into prompts.
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::User => "Usuário",
            TurnRole::Assistant => "Assistente",
        }
    }
}

/// A single immutable message in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub created_at: Timestamp,
}

impl Turn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// Renders turns as a plain transcript for prompt templates.
///
/// An empty history renders as `(vazio)` so templates never carry a dangling label.
pub fn render_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "(vazio)".to_string();
    }
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.label(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_roles() {
        assert_eq!(Turn::user("oi").role, TurnRole::User);
        assert_eq!(Turn::assistant("olá").role, TurnRole::Assistant);
    }

    #[test]
    fn render_history_labels_each_turn() {
        let turns = vec![Turn::user("oi"), Turn::assistant("olá!")];
        assert_eq!(render_history(&turns), "Usuário: oi\nAssistente: olá!");
    }

    #[test]
    fn render_history_marks_empty() {
        assert_eq!(render_history(&[]), "(vazio)");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TurnRole::Assistant).unwrap(), "\"assistant\"");
    }
}
