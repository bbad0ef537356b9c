//! Medical answers grounded in the knowledge base.
//!
//! Whether retrieval is usable is decided once, when the answerer is built.
//! A [`MedicalAnswerer::Degraded`] answerer replies with a fixed explanation
//! for its whole lifetime; callers use the same `answer` method either way.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::prompts::{rag_system, rag_unavailable_message, rag_user, RAG_SETTINGS};
use crate::application::retrieval::{RetrievalEngine, RetrievalError};
use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::triage::SymptomDetector;
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("answer synthesis failed: {0}")]
    Oracle(#[from] AIError),
}

/// Retrieval plus synthesis plus call-to-action.
pub struct RagAnswerer {
    retrieval: RetrievalEngine,
    ai_provider: Arc<dyn AIProvider>,
    detector: SymptomDetector,
}

impl RagAnswerer {
    pub fn new(retrieval: RetrievalEngine, ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            retrieval,
            ai_provider,
            detector: SymptomDetector::new(),
        }
    }

    async fn answer(
        &self,
        session_id: &SessionId,
        query: &str,
        history: &[Turn],
    ) -> Result<String, AnswerError> {
        let context = self.retrieval.context(query).await?;

        let request = RAG_SETTINGS.apply(
            CompletionRequest::new(RequestMetadata::for_session(session_id, "rag"))
                .with_system_prompt(rag_system(&context))
                .with_message(MessageRole::User, rag_user(query, history)),
        );
        let response = self.ai_provider.complete(request).await?;

        let answer = response.content.trim();
        let cta = self.detector.call_to_action(query, answer);
        Ok(format!("{}{}", answer, cta.text()))
    }
}

pub enum MedicalAnswerer {
    Available(RagAnswerer),
    Degraded { reason: String },
}

impl MedicalAnswerer {
    /// Picks the variant from the outcome of setting up retrieval.
    pub fn build(
        ai_provider: Arc<dyn AIProvider>,
        retrieval: Result<RetrievalEngine, RetrievalError>,
    ) -> Self {
        match retrieval {
            Ok(engine) => {
                info!("Knowledge retrieval available");
                Self::Available(RagAnswerer::new(engine, ai_provider))
            }
            Err(err) => {
                warn!(error = %err, "Knowledge retrieval unavailable, medical answers degraded");
                Self::Degraded {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub async fn answer(
        &self,
        session_id: &SessionId,
        query: &str,
        history: &[Turn],
    ) -> Result<String, AnswerError> {
        match self {
            Self::Available(rag) => rag.answer(session_id, query, history).await,
            Self::Degraded { reason } => Ok(rag_unavailable_message(reason)),
        }
    }
}
