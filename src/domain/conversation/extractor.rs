//! Oracle output sanitization and JSON extraction.
//!
//! Language models wrap structured answers in prose or markdown fences.
//! These helpers clean the raw text and pull out the first JSON value.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Maximum accepted oracle output length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Errors that can occur during sanitization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

/// Errors that can occur during JSON extraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Sanitization failed: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("No JSON object found in response")]
    NoJson,

    #[error("JSON parse error: {0}")]
    ParseError(String),
}

const INJECTION_MARKERS: [&str; 11] = [
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Cleans oracle output before it is parsed or shown to a user.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Validates length, drops control characters (keeping newlines and tabs)
    /// and strips chat-template markers.
    pub fn sanitize(&self, response: &str) -> Result<String, SanitizationError> {
        if response.len() > MAX_RESPONSE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: response.len(),
            });
        }

        let mut cleaned: String = response
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        for marker in INJECTION_MARKERS {
            cleaned = cleaned.replace(marker, "");
        }

        Ok(cleaned)
    }
}

/// Extracts typed JSON payloads from free-form oracle output.
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor {
    sanitizer: ResponseSanitizer,
}

impl JsonExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the first JSON object in `response` and deserializes it.
    pub fn extract<T: DeserializeOwned>(&self, response: &str) -> Result<T, ExtractionError> {
        let sanitized = self.sanitizer.sanitize(response)?;
        let json = self.locate_object(&sanitized).ok_or(ExtractionError::NoJson)?;
        serde_json::from_str(&json).map_err(|e| ExtractionError::ParseError(e.to_string()))
    }

    fn locate_object(&self, response: &str) -> Option<String> {
        let trimmed = response.trim();

        if let Some(block) = Self::from_code_block(trimmed) {
            if let Some(obj) = Self::balanced_object(&block) {
                return Some(obj);
            }
        }

        Self::balanced_object(trimmed)
    }

    fn from_code_block(s: &str) -> Option<String> {
        let fences = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

        for fence in fences {
            if let Some(start) = s.find(fence) {
                let body_start = start + fence.len();
                if let Some(end) = s[body_start..].find("```") {
                    return Some(s[body_start..body_start + end].trim().to_string());
                }
            }
        }
        None
    }

    fn balanced_object(s: &str) -> Option<String> {
        let start = s.find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape_next = false;

        for (offset, c) in s[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset + c.len_utf8();
                        return Some(s[start..end].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }
}
