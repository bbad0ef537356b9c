//! Intake Oracle Port - structured extraction of `{name, age, done}`.

use async_trait::async_trait;

use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::intake::IntakeRecord;

use super::AIError;

/// Port for intake field extraction.
///
/// Implementations must not invent values: fields absent from `text` come
/// back as `None`.
#[async_trait]
pub trait IntakeOracle: Send + Sync {
    async fn extract(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<IntakeRecord, AIError>;
}
