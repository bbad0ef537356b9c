//! GeneralResponder - greetings and off-topic chat.

use std::sync::Arc;

use crate::application::prompts::{general_user, GENERAL_SETTINGS, GENERAL_SYSTEM};
use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

pub struct GeneralResponder {
    ai_provider: Arc<dyn AIProvider>,
}

impl GeneralResponder {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    pub async fn respond(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<String, AIError> {
        let request = GENERAL_SETTINGS.apply(
            CompletionRequest::new(RequestMetadata::for_session(session_id, "general"))
                .with_system_prompt(GENERAL_SYSTEM)
                .with_message(MessageRole::User, general_user(text, history)),
        );
        let response = self.ai_provider.complete(request).await?;
        Ok(response.content.trim().to_string())
    }
}
