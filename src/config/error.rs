//! Configuration errors

use thiserror::Error;

/// Startup configuration failure
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment values that do not deserialize into `AppConfig`
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that is out of bounds
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required setting {0}")]
    MissingRequired(&'static str),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("cannot bind to {0}")]
    InvalidBindAddress(String),

    #[error("AI base URL must be an http(s) URL")]
    InvalidBaseUrl,

    #[error("Retrieval k must be between 1 and fetch_k")]
    InvalidRetrievalSize,

    #[error("MMR lambda must be within [0, 1]")]
    InvalidMmrLambda,

    #[error("Chunk overlap must be smaller than a non-zero chunk size")]
    InvalidChunking,

    #[error("Session retention must keep at least one exchange")]
    InvalidRetention,

    #[error("Session capacity must be at least one")]
    InvalidSessionCapacity,
}
