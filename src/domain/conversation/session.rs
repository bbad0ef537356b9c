//! Session aggregate: ordered turn history plus intake draft.

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::intake::IntakeDraft;

use super::Turn;

/// Default number of (user, assistant) pairs kept in history.
pub const DEFAULT_RETENTION_PAIRS: usize = 4;

/// Returns the tail of `turns` that fits in a window of `max_pairs` exchanges.
///
/// Order is preserved; only the oldest turns are dropped.
pub fn retention_window(turns: &[Turn], max_pairs: usize) -> &[Turn] {
    let keep = max_pairs.saturating_mul(2);
    if turns.len() <= keep {
        turns
    } else {
        &turns[turns.len() - keep..]
    }
}

/// One conversation, keyed by [`SessionId`].
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    turns: Vec<Turn>,
    intake_draft: IntakeDraft,
    created_at: Timestamp,
    last_active: Timestamp,
}

impl Session {
    /// Creates an empty session.
    pub fn new(id: SessionId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            turns: Vec::new(),
            intake_draft: IntakeDraft::default(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_active(&self) -> Timestamp {
        self.last_active
    }

    pub fn intake_draft(&self) -> &IntakeDraft {
        &self.intake_draft
    }

    /// Replaces the carried intake draft.
    pub fn set_intake_draft(&mut self, draft: IntakeDraft) {
        self.intake_draft = draft;
        self.touch();
    }

    /// Appends one exchange. Turns are never reordered.
    pub fn append_exchange(&mut self, user: Turn, assistant: Turn) {
        self.turns.push(user);
        self.turns.push(assistant);
        self.touch();
    }

    /// Drops the oldest turns beyond the retention window.
    ///
    /// Returns how many turns were removed.
    pub fn trim(&mut self, max_pairs: usize) -> usize {
        let keep = retention_window(&self.turns, max_pairs).len();
        let removed = self.turns.len() - keep;
        if removed > 0 {
            self.turns.drain(..removed);
        }
        removed
    }

    /// Marks the session as used now.
    pub fn touch(&mut self) {
        self.last_active = Timestamp::now();
    }

    /// True when idle for longer than `ttl_secs` as of `now`.
    pub fn is_idle(&self, now: Timestamp, ttl_secs: u64) -> bool {
        now.secs_since(&self.last_active) > ttl_secs as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_pairs(pairs: usize) -> Session {
        let mut session = Session::new(SessionId::new("s").unwrap());
        for i in 0..pairs {
            session.append_exchange(
                Turn::user(format!("pergunta {}", i)),
                Turn::assistant(format!("resposta {}", i)),
            );
        }
        session
    }

    #[test]
    fn trim_keeps_last_four_pairs_in_order() {
        let mut session = session_with_pairs(10);
        let removed = session.trim(DEFAULT_RETENTION_PAIRS);

        assert_eq!(removed, 12);
        assert_eq!(session.turns().len(), 8);
        let texts: Vec<_> = session.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "pergunta 6", "resposta 6", "pergunta 7", "resposta 7",
                "pergunta 8", "resposta 8", "pergunta 9", "resposta 9",
            ]
        );
    }

    #[test]
    fn trim_is_noop_within_window() {
        let mut session = session_with_pairs(3);
        assert_eq!(session.trim(DEFAULT_RETENTION_PAIRS), 0);
        assert_eq!(session.turns().len(), 6);
    }

    #[test]
    fn retention_window_of_zero_is_empty() {
        let session = session_with_pairs(2);
        assert!(retention_window(session.turns(), 0).is_empty());
    }

    #[test]
    fn idle_detection_uses_last_activity() {
        let session = session_with_pairs(1);
        let later = Timestamp::now();
        assert!(!session.is_idle(later, 60));
        assert!(session.is_idle(later.plus_secs(61), 60));
    }
}
