//! LLM-backed IntakeOracle.
//!
//! The oracle's JSON is decoded leniently (string ages, string booleans)
//! and then grounded in the message so values the user never wrote are
//! discarded.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::prompts::{extraction_user, EXTRACTION_SETTINGS, EXTRACTION_SYSTEM};
use crate::domain::conversation::{JsonExtractor, Turn};
use crate::domain::foundation::SessionId;
use crate::domain::intake::IntakeRecord;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, IntakeOracle, MessageRole, RequestMetadata,
};

pub struct LlmIntakeOracle {
    ai_provider: Arc<dyn AIProvider>,
    extractor: JsonExtractor,
}

impl LlmIntakeOracle {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            extractor: JsonExtractor::new(),
        }
    }
}

#[async_trait]
impl IntakeOracle for LlmIntakeOracle {
    async fn extract(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<IntakeRecord, AIError> {
        let request = EXTRACTION_SETTINGS.apply(
            CompletionRequest::new(RequestMetadata::for_session(session_id, "intake"))
                .with_system_prompt(EXTRACTION_SYSTEM)
                .with_message(MessageRole::User, extraction_user(text, history)),
        );

        let response = self.ai_provider.complete(request).await?;
        let record: IntakeRecord = self
            .extractor
            .extract(&response.content)
            .map_err(|e| AIError::parse(format!("intake extraction: {}", e)))?;

        Ok(record.grounded_in(text))
    }
}
