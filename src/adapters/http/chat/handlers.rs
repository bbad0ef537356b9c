//! HTTP handlers for the chat endpoints.
//!
//! These handlers connect Axum routes to the chat orchestrator.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{ChatError, ChatOrchestrator};
use crate::domain::foundation::SessionId;
use crate::ports::SessionStoreError;

use super::dto::{
    ChatResponse, ErrorResponse, HealthResponse, HistoryResponse, SendMessageRequest, TurnView,
    WelcomeResponse,
};

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl ChatAppState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// GET /health - Liveness plus retrieval mode.
pub async fn health(State(state): State<ChatAppState>) -> impl IntoResponse {
    let retrieval = if state.orchestrator.is_degraded() {
        "degraded"
    } else {
        "available"
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        retrieval: retrieval.to_string(),
    })
}

/// GET /api/chat/welcome - Greeting shown when a chat opens.
pub async fn welcome(State(state): State<ChatAppState>) -> impl IntoResponse {
    Json(WelcomeResponse {
        message: state.orchestrator.welcome().to_string(),
    })
}

/// POST /api/chat - Handle one user message.
///
/// # Errors
/// - 400 Bad Request: blank message or invalid session id
/// - 413 Payload Too Large: message over the character limit
pub async fn send_message(
    State(state): State<ChatAppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let session_id = match request.session_id {
        Some(raw) => SessionId::new(raw)
            .map_err(|_| ChatApiError::BadRequest("Invalid session ID".to_string()))?,
        None => SessionId::generate(),
    };

    let reply = state
        .orchestrator
        .handle(session_id, &request.message)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ChatResponse {
            session_id: reply.session_id.to_string(),
            intent: reply.intent,
            reply: reply.text,
        }),
    ))
}

/// GET /api/sessions/:session_id/history - Recorded turns, oldest first.
///
/// # Errors
/// - 404 Not Found: unknown session
pub async fn get_history(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let session_id = SessionId::new(session_id)
        .map_err(|_| ChatApiError::BadRequest("Invalid session ID".to_string()))?;

    let turns = state.orchestrator.history(&session_id).await?;

    Ok((
        StatusCode::OK,
        Json(HistoryResponse {
            session_id: session_id.to_string(),
            turns: turns.iter().map(TurnView::from).collect(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum ChatApiError {
    BadRequest(String),
    MessageTooLong(String),
    NotFound(String, String),
}

impl From<ChatError> for ChatApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ChatApiError::BadRequest(err.to_string()),
            ChatError::MessageTooLong { .. } => ChatApiError::MessageTooLong(err.to_string()),
            ChatError::Session(inner) => inner.into(),
        }
    }
}

impl From<SessionStoreError> for ChatApiError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => {
                ChatApiError::NotFound("Session".to_string(), id.to_string())
            }
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ChatApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            ChatApiError::MessageTooLong(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::message_too_long(msg),
            ),
            ChatApiError::NotFound(resource, id) => {
                (StatusCode::NOT_FOUND, ErrorResponse::not_found(&resource, &id))
            }
        };

        (status, Json(error)).into_response()
    }
}
