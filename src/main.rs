//! Dengue Assistant server binary.
//!
//! 1. Load and validate configuration from the environment
//! 2. Initialize structured logging
//! 3. Wire providers, retrieval and stores into the chat orchestrator
//! 4. Serve the HTTP API

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dengue_assistant::adapters::http::{build_app, chat::ChatAppState};
use dengue_assistant::bootstrap::build_orchestrator;
use dengue_assistant::config::AppConfig;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let orchestrator = build_orchestrator(&config).await?;
    if orchestrator.is_degraded() {
        tracing::warn!("Medical answers are running without the knowledge index");
    }

    let state = ChatAppState::new(Arc::new(orchestrator));
    let router = build_app(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind");
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, environment = ?config.server.environment, "API server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
