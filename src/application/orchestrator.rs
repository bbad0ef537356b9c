//! ChatOrchestrator - one user message in, one reply out.
//!
//! Loads and trims the session history, classifies the message, hands it to
//! the matching service and records the exchange. Any failure while
//! answering is logged and replaced by the apologetic fallback message;
//! failed turns are not recorded.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info};

use crate::application::answer::{AnswerError, MedicalAnswerer};
use crate::application::general::GeneralResponder;
use crate::application::intake::{IntakeError, IntakeService};
use crate::application::prompts::{FALLBACK_MESSAGE, WELCOME_MESSAGE};
use crate::application::router::IntentRouter;
use crate::domain::conversation::{Turn, DEFAULT_RETENTION_PAIRS};
use crate::domain::foundation::SessionId;
use crate::domain::routing::Intent;
use crate::ports::{AIError, SessionStore, SessionStoreError};

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 4000;
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Exchanges kept as history.
    pub max_pairs: usize,
    /// Budget for classification plus dispatch.
    pub turn_timeout: Duration,
    pub max_message_chars: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_pairs: DEFAULT_RETENTION_PAIRS,
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

/// Reply to one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: SessionId,
    /// `None` when the turn failed before classification finished.
    pub intent: Option<Intent>,
    pub text: String,
    /// True when `text` is the fallback message.
    pub degraded_fallback: bool,
}

/// Input rejected before any work is done.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("message has {actual} characters, the limit is {max}")]
    MessageTooLong { max: usize, actual: usize },

    #[error("session store failed: {0}")]
    Session(#[from] SessionStoreError),
}

#[derive(Debug, thiserror::Error)]
enum TurnError {
    #[error("classification failed: {0}")]
    Classification(#[from] AIError),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error("general response failed: {0}")]
    General(AIError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("turn timed out after {0:?}")]
    Timeout(Duration),
}

pub struct ChatOrchestrator {
    sessions: Arc<dyn SessionStore>,
    router: IntentRouter,
    answerer: MedicalAnswerer,
    general: GeneralResponder,
    intake: IntakeService,
    settings: OrchestratorSettings,
}

impl ChatOrchestrator {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        router: IntentRouter,
        answerer: MedicalAnswerer,
        general: GeneralResponder,
        intake: IntakeService,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            sessions,
            router,
            answerer,
            general,
            intake,
            settings,
        }
    }

    pub fn welcome(&self) -> &'static str {
        WELCOME_MESSAGE
    }

    pub fn is_degraded(&self) -> bool {
        self.answerer.is_degraded()
    }

    /// Recorded turns of an existing session, oldest first.
    pub async fn history(&self, session_id: &SessionId) -> Result<Vec<Turn>, SessionStoreError> {
        self.sessions.snapshot(session_id).await
    }

    pub async fn handle(&self, session_id: SessionId, text: &str) -> Result<ChatReply, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let chars = text.chars().count();
        if chars > self.settings.max_message_chars {
            return Err(ChatError::MessageTooLong {
                max: self.settings.max_message_chars,
                actual: chars,
            });
        }

        self.sessions.evict_expired().await;

        let dropped = self.sessions.trim(&session_id, self.settings.max_pairs).await?;
        let history = self.sessions.history(&session_id).await?;
        debug!(
            session_id = %session_id,
            history_turns = history.len(),
            dropped,
            "Loaded history"
        );

        let mut intent = None;
        match self.run_turn(&session_id, text, &history, &mut intent).await {
            Ok(reply) => {
                self.sessions
                    .append_exchange(&session_id, Turn::user(text), Turn::assistant(reply.clone()))
                    .await?;
                Ok(ChatReply {
                    session_id,
                    intent,
                    text: reply,
                    degraded_fallback: false,
                })
            }
            Err(err) => {
                error!(
                    session_id = %session_id,
                    intent = ?intent,
                    error = %err,
                    "Turn failed, replying with fallback"
                );
                Ok(ChatReply {
                    session_id,
                    intent,
                    text: FALLBACK_MESSAGE.to_string(),
                    degraded_fallback: true,
                })
            }
        }
    }

    /// Classification and dispatch under one deadline.
    ///
    /// Intake turns get the deadline passed down instead of being cancelled,
    /// so a row written on this turn is always reported and recorded.
    async fn run_turn(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
        intent: &mut Option<Intent>,
    ) -> Result<String, TurnError> {
        let budget = self.settings.turn_timeout;
        let deadline = Instant::now() + budget;

        let classification = timeout_at(deadline, self.router.route(session_id, text, history))
            .await
            .map_err(|_| TurnError::Timeout(budget))??;
        *intent = Some(classification.intent);
        info!(
            session_id = %session_id,
            intent = %classification.intent,
            rationale = %classification.rationale,
            "Message classified"
        );

        match classification.intent {
            Intent::MedicalQa => Ok(timeout_at(
                deadline,
                self.answerer.answer(session_id, text, history),
            )
            .await
            .map_err(|_| TurnError::Timeout(budget))??),
            Intent::General => timeout_at(deadline, self.general.respond(session_id, text, history))
                .await
                .map_err(|_| TurnError::Timeout(budget))?
                .map_err(TurnError::General),
            Intent::Intake => self.register(session_id, text, history, deadline).await,
        }
    }

    async fn register(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
        deadline: Instant,
    ) -> Result<String, TurnError> {
        let outcome = match self
            .intake
            .handle_until(session_id, text, history, Some(deadline))
            .await
        {
            Ok(outcome) => outcome,
            Err(IntakeError::DeadlineExceeded) => {
                return Err(TurnError::Timeout(self.settings.turn_timeout))
            }
            Err(err) => return Err(err.into()),
        };
        info!(
            session_id = %session_id,
            status = ?outcome.status,
            persisted = outcome.persisted,
            "Intake turn handled"
        );
        Ok(outcome.reply)
    }
}
