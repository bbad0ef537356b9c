//! Request and response bodies for the chat API.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Turn, TurnRole};
use crate::domain::routing::Intent;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Omitted on the first message; the server mints one.
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    /// `None` when the turn failed before it was classified.
    pub intent: Option<Intent>,
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRoleDto {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnView {
    pub role: TurnRoleDto,
    pub text: String,
    pub created_at: String,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: match turn.role {
                TurnRole::User => TurnRoleDto::User,
                TurnRole::Assistant => TurnRoleDto::Assistant,
            },
            text: turn.text.clone(),
            created_at: turn.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<TurnView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `available` or `degraded`.
    pub retrieval: String,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn message_too_long(message: impl Into<String>) -> Self {
        Self {
            code: "MESSAGE_TOO_LONG".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_missing_session_id() {
        let req: SendMessageRequest = serde_json::from_str(r#"{"message": "oi"}"#).unwrap();
        assert!(req.session_id.is_none());
        assert_eq!(req.message, "oi");
    }

    #[test]
    fn response_uses_camel_case_and_snake_intent() {
        let body = ChatResponse {
            session_id: "abc".to_string(),
            intent: Some(Intent::MedicalQa),
            reply: "ok".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["intent"], "medical_qa");
    }

    #[test]
    fn turn_view_maps_role() {
        let view = TurnView::from(&Turn::assistant("olá"));
        assert_eq!(view.role, TurnRoleDto::Assistant);
        assert_eq!(view.text, "olá");
    }

    #[test]
    fn not_found_formats_message() {
        let error = ErrorResponse::not_found("Session", "s-1");
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.message, "Session not found: s-1");
    }
}
