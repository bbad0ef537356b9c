//! Durable intake row.

use serde::{Deserialize, Serialize};

use super::IntakeRecord;

/// `{name, age}` as written to the intake store. Only built from a
/// complete record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIntakeRow {
    pub name: String,
    pub age: u8,
}

impl PersistedIntakeRow {
    /// Returns `None` unless the record is done, named and aged.
    pub fn from_record(record: &IntakeRecord) -> Option<Self> {
        if !record.is_complete() {
            return None;
        }
        Some(Self {
            name: record.name_trimmed()?.to_string(),
            age: record.age?,
        })
    }
}
