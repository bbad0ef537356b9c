//! HTTP adapters - REST API for chat front-ends.

pub mod chat;

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use chat::{chat_router, ChatApiError, ChatAppState};

/// Extra time the HTTP layer grants beyond the turn budget, so the
/// orchestrator's own fallback reply wins over a bare 408.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Full application router with tracing, timeout and CORS middleware.
pub fn build_app(state: ChatAppState, server: &ServerConfig) -> Router {
    chat_router()
        .layer(TimeoutLayer::new(server.request_timeout() + HTTP_TIMEOUT_MARGIN))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server))
        .with_state(state)
}

/// Configured origins; any origin outside production when none are set.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        cors.allow_origin(AllowOrigin::list(origins))
    } else if server.is_production() {
        cors
    } else {
        cors.allow_origin(Any)
    }
}
