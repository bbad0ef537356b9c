//! Intent Oracle Port - classifies a message into an [`Intent`].
//!
//! [`Intent`]: crate::domain::routing::Intent

use async_trait::async_trait;

use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::routing::ClassificationResult;

use super::AIError;

/// Errors from intent classification.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// The oracle could not be reached or refused the request.
    #[error("classifier unavailable: {0}")]
    Oracle(#[from] AIError),

    /// The oracle answered but the answer is not a valid classification.
    #[error("malformed classification: {0}")]
    Malformed(String),
}

/// Port for intent classification.
#[async_trait]
pub trait IntentOracle: Send + Sync {
    async fn classify(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<ClassificationResult, RoutingError>;
}
