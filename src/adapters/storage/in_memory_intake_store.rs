//! In-Memory Intake Store Adapter
//!
//! Keeps rows in a vector. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::intake::PersistedIntakeRow;
use crate::ports::{IntakeStore, IntakeStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryIntakeStore {
    rows: Arc<RwLock<Vec<PersistedIntakeRow>>>,
}

impl InMemoryIntakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted rows
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl IntakeStore for InMemoryIntakeStore {
    async fn persist(&self, row: &PersistedIntakeRow) -> Result<(), IntakeStoreError> {
        self.rows.write().await.push(row.clone());
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<PersistedIntakeRow>, IntakeStoreError> {
        Ok(self.rows.read().await.clone())
    }
}
