//! IntakeService - the name/age registration flow.
//!
//! Extraction, the PENDING/OK decision, persistence on completion and the
//! confirmation text. With carry-forward enabled, partial fields from
//! earlier intake turns of the same session are kept as a draft and merged
//! under each new extraction.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use crate::application::prompts::{
    confirmation_user, CONFIRMATION_SETTINGS, CONFIRMATION_SYSTEM, PERSISTENCE_FAILED_MESSAGE,
};
use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::intake::{
    evaluate, IntakeDraft, IntakeEvaluation, IntakeField, IntakeStatus, PersistedIntakeRow,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, IntakeOracle, IntakeStore, MessageRole,
    RequestMetadata, SessionStore, SessionStoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("intake extraction failed: {0}")]
    Extraction(#[from] AIError),

    #[error("session store failed: {0}")]
    Session(#[from] SessionStoreError),

    #[error("intake extraction ran past the turn deadline")]
    DeadlineExceeded,
}

/// Result of one intake turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub status: IntakeStatus,
    pub missing: Vec<IntakeField>,
    /// True when a row was written on this turn.
    pub persisted: bool,
    pub reply: String,
}

pub struct IntakeService {
    oracle: Arc<dyn IntakeOracle>,
    store: Arc<dyn IntakeStore>,
    sessions: Arc<dyn SessionStore>,
    ai_provider: Arc<dyn AIProvider>,
    carry_forward: bool,
}

impl IntakeService {
    pub fn new(
        oracle: Arc<dyn IntakeOracle>,
        store: Arc<dyn IntakeStore>,
        sessions: Arc<dyn SessionStore>,
        ai_provider: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            oracle,
            store,
            sessions,
            ai_provider,
            carry_forward: true,
        }
    }

    /// With `false`, each message is evaluated on its own.
    pub fn with_carry_forward(mut self, carry_forward: bool) -> Self {
        self.carry_forward = carry_forward;
        self
    }

    pub async fn handle(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<IntakeOutcome, IntakeError> {
        self.handle_until(session_id, text, history, None).await
    }

    /// Like [`handle`](Self::handle), with the oracle calls bounded by
    /// `deadline`.
    ///
    /// Extraction past the deadline fails the turn before anything is
    /// written. Once a row is persisted the outcome is always returned; a
    /// late confirmation degrades to the evaluation message.
    pub async fn handle_until(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
        deadline: Option<Instant>,
    ) -> Result<IntakeOutcome, IntakeError> {
        let extracted = within(deadline, self.oracle.extract(session_id, text, history))
            .await
            .ok_or(IntakeError::DeadlineExceeded)??;

        let record = if self.carry_forward {
            self.sessions.intake_draft(session_id).await?.merge(&extracted)
        } else {
            extracted
        };
        let evaluation = evaluate(&record);

        let persisted = match PersistedIntakeRow::from_record(&record) {
            Some(row) if evaluation.is_ok() => {
                // Cleared first so an interrupted turn cannot leave a completed draft behind.
                self.sessions.clear_intake_draft(session_id).await?;
                match self.store.persist(&row).await {
                    Ok(()) => {
                        info!(session_id = %session_id, "Intake registered");
                        true
                    }
                    Err(err) => {
                        error!(session_id = %session_id, error = %err, "Intake persistence failed");
                        self.remember(session_id, IntakeDraft::from_record(&record)).await?;
                        return Ok(IntakeOutcome {
                            status: IntakeStatus::Pending,
                            missing: Vec::new(),
                            persisted: false,
                            reply: PERSISTENCE_FAILED_MESSAGE.to_string(),
                        });
                    }
                }
            }
            _ => {
                self.remember(session_id, IntakeDraft::from_record(&record)).await?;
                false
            }
        };

        let reply = match within(deadline, self.confirm(session_id, &evaluation, text, history)).await
        {
            Some(reply) => reply,
            None => {
                warn!(session_id = %session_id, persisted, "Confirmation ran past the turn deadline");
                evaluation.message.clone()
            }
        };
        Ok(IntakeOutcome {
            status: evaluation.status,
            missing: evaluation.missing,
            persisted,
            reply,
        })
    }

    async fn remember(&self, session_id: &SessionId, draft: IntakeDraft) -> Result<(), IntakeError> {
        if self.carry_forward {
            self.sessions.set_intake_draft(session_id, draft).await?;
        }
        Ok(())
    }

    /// Friendly rewording of the evaluation; the raw message on failure.
    async fn confirm(
        &self,
        session_id: &SessionId,
        evaluation: &IntakeEvaluation,
        text: &str,
        history: &[Turn],
    ) -> String {
        let request = CONFIRMATION_SETTINGS.apply(
            CompletionRequest::new(RequestMetadata::for_session(session_id, "confirmation"))
                .with_system_prompt(CONFIRMATION_SYSTEM)
                .with_message(
                    MessageRole::User,
                    confirmation_user(&evaluation.message, text, history),
                ),
        );

        match self.ai_provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => evaluation.message.clone(),
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "Confirmation synthesis failed");
                evaluation.message.clone()
            }
        }
    }
}

async fn within<F: Future>(deadline: Option<Instant>, work: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, work).await.ok(),
        None => Some(work.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{LlmIntakeOracle, MockAIProvider, MockError};
    use crate::adapters::storage::{InMemoryIntakeStore, InMemorySessionStore};
    use crate::ports::IntakeStoreError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct BrokenStore;

    #[async_trait]
    impl IntakeStore for BrokenStore {
        async fn persist(&self, _row: &PersistedIntakeRow) -> Result<(), IntakeStoreError> {
            Err(IntakeStoreError::Io("disk full".to_string()))
        }

        async fn rows(&self) -> Result<Vec<PersistedIntakeRow>, IntakeStoreError> {
            Ok(Vec::new())
        }
    }

    struct Fixture {
        provider: Arc<MockAIProvider>,
        store: Arc<InMemoryIntakeStore>,
        sessions: Arc<InMemorySessionStore>,
    }

    impl Fixture {
        fn new(provider: MockAIProvider) -> Self {
            Self {
                provider: Arc::new(provider),
                store: Arc::new(InMemoryIntakeStore::new()),
                sessions: Arc::new(InMemorySessionStore::default()),
            }
        }

        fn service(&self) -> IntakeService {
            IntakeService::new(
                Arc::new(LlmIntakeOracle::new(self.provider.clone())),
                self.store.clone(),
                self.sessions.clone(),
                self.provider.clone(),
            )
        }
    }

    fn session() -> SessionId {
        SessionId::new("intake-test").unwrap()
    }

    #[tokio::test]
    async fn complete_record_is_persisted_once() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": 22, "concluir": true}"#)
                .with_purpose_response("confirmation", "Cadastro de Ana concluído!"),
        );

        let outcome = fixture
            .service()
            .handle(&session(), "meu nome é Ana, tenho 22 anos, concluir", &[])
            .await
            .unwrap();

        assert_eq!(outcome.status, IntakeStatus::Ok);
        assert!(outcome.persisted);
        assert_eq!(outcome.reply, "Cadastro de Ana concluído!");
        let rows = fixture.store.rows().await.unwrap();
        assert_eq!(
            rows,
            vec![PersistedIntakeRow {
                name: "Ana".to_string(),
                age: 22
            }]
        );
    }

    #[tokio::test]
    async fn bare_completion_stays_pending_without_persisting() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": null, "idade": null, "concluir": true}"#),
        );

        let outcome = fixture
            .service()
            .handle(&session(), "concluir", &[])
            .await
            .unwrap();

        assert_eq!(outcome.status, IntakeStatus::Pending);
        assert_eq!(outcome.missing, vec![IntakeField::Name, IntakeField::Age]);
        assert!(!outcome.persisted);
        assert_eq!(fixture.store.count().await, 0);
    }

    #[tokio::test]
    async fn partial_fields_carry_forward_across_turns() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": null, "concluir": false}"#)
                .with_purpose_response("intake", r#"{"nome": null, "idade": 22, "concluir": true}"#),
        );
        let service = fixture.service();

        let first = service.handle(&session(), "meu nome é Ana", &[]).await.unwrap();
        assert_eq!(first.missing, vec![IntakeField::Age]);

        let second = service
            .handle(&session(), "tenho 22 anos, concluir", &[])
            .await
            .unwrap();
        assert_eq!(second.status, IntakeStatus::Ok);
        assert_eq!(fixture.store.count().await, 1);
        assert!(fixture.sessions.intake_draft(&session()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn without_carry_forward_each_message_stands_alone() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": null, "concluir": false}"#)
                .with_purpose_response("intake", r#"{"nome": null, "idade": 22, "concluir": true}"#),
        );
        let service = fixture.service().with_carry_forward(false);

        service.handle(&session(), "meu nome é Ana", &[]).await.unwrap();
        let second = service
            .handle(&session(), "tenho 22 anos, concluir", &[])
            .await
            .unwrap();

        assert_eq!(second.status, IntakeStatus::Pending);
        assert_eq!(second.missing, vec![IntakeField::Name]);
        assert_eq!(fixture.store.count().await, 0);
    }

    #[tokio::test]
    async fn confirmation_failure_returns_evaluation_message() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": 22, "concluir": true}"#)
                .with_purpose_error("confirmation", MockError::AuthenticationFailed),
        );

        let outcome = fixture
            .service()
            .handle(&session(), "Ana, 22 anos, concluir", &[])
            .await
            .unwrap();

        assert_eq!(outcome.reply, "CADASTRO_OK\nNome: Ana\nIdade: 22");
        assert!(outcome.persisted);
    }

    #[tokio::test]
    async fn persistence_failure_is_reported_and_draft_kept() {
        let provider = Arc::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": 22, "concluir": true}"#),
        );
        let sessions = Arc::new(InMemorySessionStore::default());
        let service = IntakeService::new(
            Arc::new(LlmIntakeOracle::new(provider.clone())),
            Arc::new(BrokenStore),
            sessions.clone(),
            provider.clone(),
        );

        let outcome = service
            .handle(&session(), "Ana, 22 anos, concluir", &[])
            .await
            .unwrap();

        assert_eq!(outcome.reply, PERSISTENCE_FAILED_MESSAGE);
        assert!(!outcome.persisted);
        assert_eq!(provider.calls_for("confirmation"), 0);
        let draft = sessions.intake_draft(&session()).await.unwrap();
        assert_eq!(draft.name.as_deref(), Some("Ana"));
        assert_eq!(draft.age, Some(22));
    }

    #[tokio::test]
    async fn extraction_failure_is_an_error() {
        let fixture = Fixture::new(
            MockAIProvider::new().with_purpose_response("intake", "não entendi"),
        );

        let err = fixture
            .service()
            .handle(&session(), "meu nome é Ana", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::Extraction(AIError::Parse(_))));
    }

    #[tokio::test]
    async fn late_confirmation_still_reports_the_registration() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": 22, "concluir": true}"#)
                .with_purpose_response("confirmation", "Cadastro de Ana concluído!")
                .with_purpose_delay("confirmation", Duration::from_millis(300)),
        );
        let deadline = Instant::now() + Duration::from_millis(50);

        let outcome = fixture
            .service()
            .handle_until(&session(), "Ana, 22 anos, concluir", &[], Some(deadline))
            .await
            .unwrap();

        assert!(outcome.persisted);
        assert_eq!(outcome.status, IntakeStatus::Ok);
        assert_eq!(outcome.reply, "CADASTRO_OK\nNome: Ana\nIdade: 22");
        assert_eq!(fixture.store.count().await, 1);
        assert!(fixture.sessions.intake_draft(&session()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn late_extraction_writes_nothing() {
        let fixture = Fixture::new(
            MockAIProvider::new()
                .with_purpose_response("intake", r#"{"nome": "Ana", "idade": 22, "concluir": true}"#)
                .with_purpose_delay("intake", Duration::from_millis(300)),
        );
        let deadline = Instant::now() + Duration::from_millis(50);

        let err = fixture
            .service()
            .handle_until(&session(), "Ana, 22 anos, concluir", &[], Some(deadline))
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::DeadlineExceeded));
        assert_eq!(fixture.store.count().await, 0);
    }
}
