//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Credential variable accepted when the prefixed key is unset.
pub const FALLBACK_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// OpenAI-compatible provider configuration (chat and embeddings)
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the provider
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on retryable failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, if non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Fills a missing key from `fallback`.
    pub(crate) fn with_fallback_key(mut self, fallback: Option<String>) -> Self {
        if !self.has_api_key() {
            self.api_key = fallback.filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired(
                "DENGUE_ASSISTANT__AI__API_KEY or GOOGLE_API_KEY",
            ));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_chat_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.chat_model, "gemini-2.5-flash");
        assert_eq!(config.embedding_model, "text-embedding-004");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 15,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = AiConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!config.has_api_key());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired(
                "DENGUE_ASSISTANT__AI__API_KEY or GOOGLE_API_KEY"
            ))
        );
    }

    #[test]
    fn test_fallback_key_only_fills_gaps() {
        let config = AiConfig::default().with_fallback_key(Some("google-key".to_string()));
        assert_eq!(config.api_key(), Some("google-key"));

        let config = AiConfig {
            api_key: Some("primary".to_string()),
            ..Default::default()
        }
        .with_fallback_key(Some("google-key".to_string()));
        assert_eq!(config.api_key(), Some("primary"));
    }

    #[test]
    fn test_validation_rejects_non_http_base_url() {
        let config = AiConfig {
            api_key: Some("k".to_string()),
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBaseUrl));
    }

    #[test]
    fn test_validation_valid_config() {
        let config = AiConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
