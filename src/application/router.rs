//! IntentRouter - picks the handling strategy for one message.

use std::sync::Arc;

use tracing::warn;

use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::routing::ClassificationResult;
use crate::ports::{AIError, IntentOracle, RoutingError};

/// Wraps an [`IntentOracle`] and absorbs malformed answers.
///
/// A classifier answer that cannot be parsed sends the message down the
/// General path. Transport failures are returned to the caller.
pub struct IntentRouter {
    oracle: Arc<dyn IntentOracle>,
}

impl IntentRouter {
    pub fn new(oracle: Arc<dyn IntentOracle>) -> Self {
        Self { oracle }
    }

    pub async fn route(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<ClassificationResult, AIError> {
        match self.oracle.classify(session_id, text, history).await {
            Ok(result) => Ok(result),
            Err(RoutingError::Malformed(reason)) => {
                warn!(
                    session_id = %session_id,
                    reason = %reason,
                    "Classifier answer malformed, routing to general"
                );
                Ok(ClassificationResult::fallback(reason))
            }
            Err(RoutingError::Oracle(err)) => Err(err),
        }
    }
}
