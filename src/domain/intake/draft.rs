//! Partial intake fields carried between turns of one session.

use serde::{Deserialize, Serialize};

use super::IntakeRecord;

/// Name and age captured by earlier intake turns that have not yet been
/// registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeDraft {
    pub name: Option<String>,
    pub age: Option<u8>,
}

impl IntakeDraft {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }

    /// Overlays a fresh extraction on the draft.
    ///
    /// Non-empty values from `current` win; `done` always comes from
    /// `current`.
    pub fn merge(&self, current: &IntakeRecord) -> IntakeRecord {
        let name = current
            .name_trimmed()
            .map(str::to_string)
            .or_else(|| self.name.clone());
        IntakeRecord {
            name,
            age: current.age.or(self.age),
            done: current.done,
        }
    }

    /// Snapshot of the non-empty fields of `record`.
    pub fn from_record(record: &IntakeRecord) -> Self {
        Self {
            name: record.name_trimmed().map(str::to_string),
            age: record.age,
        }
    }
}
