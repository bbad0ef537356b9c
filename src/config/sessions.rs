//! Session retention configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Exchanges (user + assistant pairs) kept per session
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,

    /// Idle time before a session is evicted, in seconds
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,

    /// Live sessions kept before the least recent one is dropped
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl SessionsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_pairs == 0 {
            return Err(ValidationError::InvalidRetention);
        }
        if self.max_sessions == 0 {
            return Err(ValidationError::InvalidSessionCapacity);
        }
        Ok(())
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_pairs: default_max_pairs(),
            idle_ttl_secs: default_idle_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_max_pairs() -> usize {
    4
}

fn default_idle_ttl() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    10_000
}
