//! Settings read from the process environment.
//!
//! Every key lives under the `DENGUE_ASSISTANT` prefix with `__` between
//! section and field, and every section has a usable default. Only the
//! provider credential has to be supplied.
//!
//! ```no_run
//! use dengue_assistant::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration");
//! config.validate().expect("valid configuration");
//! ```

mod ai;
mod error;
mod intake;
mod knowledge;
mod server;
mod sessions;

pub use ai::{AiConfig, FALLBACK_API_KEY_VAR};
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;
pub use knowledge::KnowledgeConfig;
pub use server::{Environment, ServerConfig};
pub use sessions::SessionsConfig;

use serde::Deserialize;

/// All sections, as loaded by [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat and embedding endpoint shared by both clients
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,
}

impl AppConfig {
    /// Reads `.env` (when present) and the process environment.
    ///
    /// `DENGUE_ASSISTANT__SERVER__PORT=8080` sets `server.port`; a bare
    /// `GOOGLE_API_KEY` is used when `DENGUE_ASSISTANT__AI__API_KEY` is unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DENGUE_ASSISTANT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.ai = config
            .ai
            .with_fallback_key(std::env::var(FALLBACK_API_KEY_VAR).ok());

        Ok(config)
    }

    /// Checks every section; a missing credential is `MissingRequired`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.knowledge.validate()?;
        self.sessions.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
