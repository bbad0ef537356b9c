//! In-Memory Session Store Adapter
//!
//! Sessions live in a map of per-session mutexes behind a `RwLock`: lookups
//! of distinct sessions only contend on the read lock, and creation is an
//! atomic get-or-create under the write lock. Idle sessions are evicted by
//! TTL, and the least recently active one is dropped when the store is full.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::conversation::{Session, Turn};
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::intake::IntakeDraft;
use crate::ports::{SessionStore, SessionStoreError};

/// Default idle time before a session is evicted.
pub const DEFAULT_IDLE_TTL_SECS: u64 = 3600;

/// Default maximum number of live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

type SessionHandle = Arc<Mutex<Session>>;

/// In-memory storage for chat sessions
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    idle_ttl_secs: u64,
    max_sessions: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL_SECS, DEFAULT_MAX_SESSIONS)
    }
}

impl InMemorySessionStore {
    pub fn new(idle_ttl_secs: u64, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl_secs,
            max_sessions: max_sessions.max(1),
        }
    }

    async fn existing(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn get_or_create(&self, id: &SessionId) -> SessionHandle {
        if let Some(handle) = self.existing(id).await {
            return handle;
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id) {
            return handle.clone();
        }
        if sessions.len() >= self.max_sessions {
            Self::evict_least_recent(&mut sessions);
        }
        tracing::debug!(session_id = %id, "creating session");
        let handle = Arc::new(Mutex::new(Session::new(id.clone())));
        sessions.insert(id.clone(), handle.clone());
        handle
    }

    /// Drops the least recently active session that is not in use.
    fn evict_least_recent(sessions: &mut HashMap<SessionId, SessionHandle>) {
        let oldest = sessions
            .iter()
            .filter_map(|(id, handle)| {
                handle
                    .try_lock()
                    .ok()
                    .map(|session| (id.clone(), session.last_active()))
            })
            .min_by_key(|(_, last_active)| *last_active.as_datetime())
            .map(|(id, _)| id);

        if let Some(id) = oldest {
            tracing::info!(session_id = %id, "evicting least recently active session");
            sessions.remove(&id);
        }
    }

    /// Evicts sessions idle for longer than the TTL as of `now`.
    pub async fn evict_idle_as_of(&self, now: Timestamp) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.idle_ttl_secs;
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_idle(now, ttl),
            // In use right now, so not idle.
            Err(_) => true,
        });
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn history(&self, id: &SessionId) -> Result<Vec<Turn>, SessionStoreError> {
        let handle = self.get_or_create(id).await;
        let mut session = handle.lock().await;
        session.touch();
        Ok(session.turns().to_vec())
    }

    async fn snapshot(&self, id: &SessionId) -> Result<Vec<Turn>, SessionStoreError> {
        let handle = self
            .existing(id)
            .await
            .ok_or_else(|| SessionStoreError::NotFound(id.clone()))?;
        let session = handle.lock().await;
        Ok(session.turns().to_vec())
    }

    async fn trim(&self, id: &SessionId, max_pairs: usize) -> Result<usize, SessionStoreError> {
        let handle = self.get_or_create(id).await;
        let removed = {
            let mut session = handle.lock().await;
            session.touch();
            session.trim(max_pairs)
        };
        if removed > 0 {
            tracing::debug!(session_id = %id, removed, "trimmed session history");
        }
        Ok(removed)
    }

    async fn append_exchange(
        &self,
        id: &SessionId,
        user: Turn,
        assistant: Turn,
    ) -> Result<(), SessionStoreError> {
        let handle = self.get_or_create(id).await;
        handle.lock().await.append_exchange(user, assistant);
        Ok(())
    }

    async fn intake_draft(&self, id: &SessionId) -> Result<IntakeDraft, SessionStoreError> {
        let handle = self.get_or_create(id).await;
        let mut session = handle.lock().await;
        session.touch();
        Ok(session.intake_draft().clone())
    }

    async fn set_intake_draft(
        &self,
        id: &SessionId,
        draft: IntakeDraft,
    ) -> Result<(), SessionStoreError> {
        let handle = self.get_or_create(id).await;
        handle.lock().await.set_intake_draft(draft);
        Ok(())
    }

    async fn evict_expired(&self) -> usize {
        let evicted = self.evict_idle_as_of(Timestamp::now()).await;
        if evicted > 0 {
            tracing::info!(evicted, "evicted idle sessions");
        }
        evicted
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
