//! UTC instants for turns and session activity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }

    pub fn minus_secs(&self, secs: u64) -> Self {
        Self(self.0 - Duration::seconds(secs as i64))
    }

    /// Whole seconds from `earlier` to `self`; negative if `earlier` is later.
    pub fn secs_since(&self, earlier: &Timestamp) -> i64 {
        self.0.signed_duration_since(earlier.0).num_seconds()
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_move_in_both_directions() {
        let base = Timestamp::now();
        assert_eq!(base.plus_secs(90).secs_since(&base), 90);
        assert_eq!(base.minus_secs(30).secs_since(&base), -30);
        assert!(base.minus_secs(1) < base);
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = Timestamp::now();
        let json = serde_json::to_value(ts).unwrap();
        assert!(json.is_string());
        let back: Timestamp = serde_json::from_value(json).unwrap();
        assert_eq!(ts, back);
    }
}
