//! Axum routes for the chat endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_history, health, send_message, welcome, ChatAppState};

/// Creates routes for chat endpoints.
///
/// REST Endpoints:
/// - GET /chat/welcome - Greeting text
/// - POST /chat - Send one message
/// - GET /sessions/:session_id/history - Recorded turns of a session
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/chat/welcome", get(welcome))
        .route("/chat", post(send_message))
        .route("/sessions/:session_id/history", get(get_history))
}

/// Combined router: chat routes under /api plus GET /health.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", chat_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_router_creates_combined_router() {
        let _router = chat_router();
    }
}
