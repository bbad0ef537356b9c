//! Session Store Port - per-session turn history and intake draft.
//!
//! Sessions are created on first reference. A single session is not
//! driven by concurrent requests, but distinct sessions are.

use async_trait::async_trait;

use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::intake::IntakeDraft;

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
}

/// Port for conversation history storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session's turns, creating an empty session if needed.
    async fn history(&self, id: &SessionId) -> Result<Vec<Turn>, SessionStoreError>;

    /// Returns the turns of an existing session without creating one.
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if the session is unknown
    async fn snapshot(&self, id: &SessionId) -> Result<Vec<Turn>, SessionStoreError>;

    /// Drops the oldest turns beyond `max_pairs` exchanges.
    ///
    /// # Returns
    /// The number of turns removed
    async fn trim(&self, id: &SessionId, max_pairs: usize) -> Result<usize, SessionStoreError>;

    /// Appends one (user, assistant) pair.
    async fn append_exchange(
        &self,
        id: &SessionId,
        user: Turn,
        assistant: Turn,
    ) -> Result<(), SessionStoreError>;

    /// Partial intake fields carried between turns.
    async fn intake_draft(&self, id: &SessionId) -> Result<IntakeDraft, SessionStoreError>;

    async fn set_intake_draft(
        &self,
        id: &SessionId,
        draft: IntakeDraft,
    ) -> Result<(), SessionStoreError>;

    async fn clear_intake_draft(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.set_intake_draft(id, IntakeDraft::default()).await
    }

    /// Removes sessions past their idle TTL.
    ///
    /// # Returns
    /// The number of sessions evicted
    async fn evict_expired(&self) -> usize;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}
