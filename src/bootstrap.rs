//! Composition root - wires configuration, adapters and services.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::ai::{
    EmbeddingConfig, LlmIntakeOracle, LlmIntentOracle, OpenAIConfig, OpenAIEmbeddingProvider,
    OpenAIProvider,
};
use crate::adapters::knowledge::FileVectorIndex;
use crate::adapters::storage::{CsvIntakeStore, InMemorySessionStore};
use crate::application::{
    ChatOrchestrator, GeneralResponder, IntakeService, IntentRouter, MedicalAnswerer,
    OrchestratorSettings, RetrievalEngine, RetrievalError, RetrievalSettings,
};
use crate::config::{AppConfig, ConfigError};
use crate::ports::{
    AIError, AIProvider, EmbeddingError, EmbeddingProvider, IntakeStore, SessionStore,
    SimilarityIndex,
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("AI provider setup failed: {0}")]
    Provider(#[from] AIError),
}

pub fn retrieval_settings(config: &AppConfig) -> RetrievalSettings {
    RetrievalSettings {
        k: config.knowledge.k,
        fetch_k: config.knowledge.fetch_k,
        lambda: config.knowledge.mmr_lambda,
    }
}

pub fn orchestrator_settings(config: &AppConfig) -> OrchestratorSettings {
    OrchestratorSettings {
        max_pairs: config.sessions.max_pairs,
        turn_timeout: config.server.request_timeout(),
        ..OrchestratorSettings::default()
    }
}

/// The chat provider; fails when no credential is configured.
pub fn chat_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, StartupError> {
    let api_key = config
        .ai
        .api_key()
        .ok_or(AIError::AuthenticationFailed)?;
    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_base_url(config.ai.base_url.clone())
            .with_model(config.ai.chat_model.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;
    let info = provider.provider_info();
    info!(provider = %info.name, model = %info.model, "Chat provider ready");
    Ok(Arc::new(provider))
}

/// The embedding provider, or why it cannot be built.
pub fn embedding_provider(
    config: &AppConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let provider = OpenAIEmbeddingProvider::new(
        EmbeddingConfig::new(config.ai.api_key().unwrap_or_default())
            .with_base_url(config.ai.base_url.clone())
            .with_model(config.ai.embedding_model.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;
    Ok(Arc::new(provider))
}

/// Opens the persisted collection and pairs it with the embedder.
pub async fn connect_retrieval(
    config: &AppConfig,
    embedder: Result<Arc<dyn EmbeddingProvider>, EmbeddingError>,
) -> Result<RetrievalEngine, RetrievalError> {
    let embedder = embedder?;
    let index = FileVectorIndex::open(&config.knowledge.index_dir, &config.knowledge.collection).await?;

    if index.is_empty().await {
        warn!(path = %index.path().display(), "Knowledge index is empty");
    }
    if let Some(model) = index.model().await {
        if model != embedder.model() {
            warn!(
                index_model = %model,
                query_model = embedder.model(),
                "Knowledge index was built with a different embedding model"
            );
        }
    }

    Ok(RetrievalEngine::new(
        embedder,
        Arc::new(index),
        retrieval_settings(config),
    ))
}

/// Builds the orchestrator around explicit providers.
pub async fn build_orchestrator_with(
    config: &AppConfig,
    ai_provider: Arc<dyn AIProvider>,
    embedder: Result<Arc<dyn EmbeddingProvider>, EmbeddingError>,
    sessions: Arc<dyn SessionStore>,
    intake_store: Arc<dyn IntakeStore>,
) -> ChatOrchestrator {
    let retrieval = connect_retrieval(config, embedder).await;

    ChatOrchestrator::new(
        sessions.clone(),
        IntentRouter::new(Arc::new(LlmIntentOracle::new(ai_provider.clone()))),
        MedicalAnswerer::build(ai_provider.clone(), retrieval),
        GeneralResponder::new(ai_provider.clone()),
        IntakeService::new(
            Arc::new(LlmIntakeOracle::new(ai_provider.clone())),
            intake_store,
            sessions,
            ai_provider,
        )
        .with_carry_forward(config.intake.carry_forward),
        orchestrator_settings(config),
    )
}

/// Validates `config` and builds the production orchestrator.
pub async fn build_orchestrator(config: &AppConfig) -> Result<ChatOrchestrator, StartupError> {
    config.validate().map_err(ConfigError::from)?;

    let ai_provider = chat_provider(config)?;
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
        config.sessions.idle_ttl_secs,
        config.sessions.max_sessions,
    ));
    let intake_store: Arc<dyn IntakeStore> = Arc::new(CsvIntakeStore::new(&config.intake.csv_path));
    info!(
        csv_path = %config.intake.csv_path.display(),
        index_dir = %config.knowledge.index_dir.display(),
        collection = %config.knowledge.collection,
        "Wiring chat services"
    );

    Ok(build_orchestrator_with(
        config,
        ai_provider,
        embedding_provider(config),
        sessions,
        intake_store,
    )
    .await)
}
