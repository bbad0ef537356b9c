//! Chat HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChatResponse, ErrorResponse, HealthResponse, HistoryResponse, SendMessageRequest, TurnRoleDto,
    TurnView, WelcomeResponse,
};
pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{chat_router, chat_routes};
