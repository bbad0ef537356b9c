//! Intake Store Port - append-only storage of completed registrations.

use async_trait::async_trait;

use crate::domain::intake::PersistedIntakeRow;

/// Errors that can occur while persisting intake rows.
#[derive(Debug, thiserror::Error)]
pub enum IntakeStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("failed to encode row: {0}")]
    Encoding(String),
}

impl From<std::io::Error> for IntakeStoreError {
    fn from(err: std::io::Error) -> Self {
        IntakeStoreError::Io(err.to_string())
    }
}

/// Port for durable intake storage.
///
/// Appends are not idempotent: every call writes one row.
#[async_trait]
pub trait IntakeStore: Send + Sync {
    /// Appends one row, writing the header first when the store is new.
    async fn persist(&self, row: &PersistedIntakeRow) -> Result<(), IntakeStoreError>;

    /// Reads every stored row in write order.
    async fn rows(&self) -> Result<Vec<PersistedIntakeRow>, IntakeStoreError>;
}
