//! Intake record as produced by the extraction oracle.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Oldest age accepted by the intake form.
pub const MAX_AGE: u8 = 130;

static AGE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\b").expect("static age pattern compiles"));

/// Extracts an age from free text: the first standalone run of 1-3 digits,
/// kept only when it falls in `0..=MAX_AGE`.
///
/// Never fails; anything unusable becomes `None`.
pub fn coerce_age_text(text: &str) -> Option<u8> {
    let digits = AGE_DIGITS.captures(text)?.get(1)?.as_str();
    digits.parse::<u16>().ok().and_then(age_in_range)
}

/// Coerces an arbitrary JSON value into an age.
///
/// Integers and integral floats are range-checked, strings go through
/// [`coerce_age_text`], everything else is `None`.
pub fn coerce_age(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                u16::try_from(i).ok().and_then(age_in_range)
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && (0.0..=f64::from(MAX_AGE)).contains(&f) {
                    Some(f as u8)
                } else {
                    None
                }
            } else {
                None
            }
        }
        Value::String(s) => coerce_age_text(s),
        _ => None,
    }
}

fn age_in_range(age: u16) -> Option<u8> {
    if age <= u16::from(MAX_AGE) {
        u8::try_from(age).ok()
    } else {
        None
    }
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_age))
}

fn deserialize_done<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "sim"),
        _ => false,
    })
}

/// `{ name, age, done }` for one extraction call.
///
/// Wire names follow the extraction prompt (`nome`, `idade`, `concluir`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,

    #[serde(rename = "idade", default, deserialize_with = "deserialize_age")]
    pub age: Option<u8>,

    #[serde(rename = "concluir", default, deserialize_with = "deserialize_done")]
    pub done: bool,
}

impl IntakeRecord {
    pub fn new(name: Option<String>, age: Option<u8>, done: bool) -> Self {
        Self { name, age, done }
    }

    /// Name with surrounding whitespace removed, `None` when blank.
    pub fn name_trimmed(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn has_name(&self) -> bool {
        self.name_trimmed().is_some()
    }

    pub fn has_age(&self) -> bool {
        self.age.is_some()
    }

    /// Ready to be persisted: done, named and aged.
    pub fn is_complete(&self) -> bool {
        self.done && self.has_name() && self.has_age()
    }

    /// Drops values that do not appear in `source`.
    ///
    /// A name must occur in the text (case-insensitive, whitespace
    /// collapsed); an age must occur as a standalone number.
    pub fn grounded_in(mut self, source: &str) -> Self {
        let haystack = normalize(source);

        if let Some(name) = self.name_trimmed() {
            if !haystack.contains(&normalize(name)) {
                tracing::debug!("dropping extracted name not present in message");
                self.name = None;
            }
        }

        if let Some(age) = self.age {
            let present = AGE_DIGITS
                .captures_iter(source)
                .filter_map(|c| c.get(1))
                .filter_map(|m| m.as_str().parse::<u16>().ok())
                .any(|n| n == u16::from(age));
            if !present {
                tracing::debug!(age, "dropping extracted age not present in message");
                self.age = None;
            }
        }

        self
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn coerce_age_text_takes_first_digit_run() {
        assert_eq!(coerce_age_text("tenho 22 anos"), Some(22));
        assert_eq!(coerce_age_text("22 anos, nasci em 2003"), Some(22));
    }

    #[test]
    fn coerce_age_text_rejects_out_of_range_and_garbage() {
        assert_eq!(coerce_age_text("idade 999"), None);
        assert_eq!(coerce_age_text("vinte e dois"), None);
        assert_eq!(coerce_age_text(""), None);
        assert_eq!(coerce_age_text("1234"), None);
    }

    #[test]
    fn coerce_age_accepts_json_shapes() {
        assert_eq!(coerce_age(&json!(40)), Some(40));
        assert_eq!(coerce_age(&json!(40.0)), Some(40));
        assert_eq!(coerce_age(&json!("40 anos")), Some(40));
        assert_eq!(coerce_age(&json!(40.5)), None);
        assert_eq!(coerce_age(&json!(-3)), None);
        assert_eq!(coerce_age(&json!(131)), None);
        assert_eq!(coerce_age(&json!(true)), None);
        assert_eq!(coerce_age(&Value::Null), None);
    }

    #[test]
    fn deserializes_wire_names_and_coerces() {
        let record: IntakeRecord =
            serde_json::from_value(json!({"nome": "Ana", "idade": "22", "concluir": true})).unwrap();
        assert_eq!(record, IntakeRecord::new(Some("Ana".into()), Some(22), true));
    }

    #[test]
    fn deserializes_missing_fields_as_empty() {
        let record: IntakeRecord = serde_json::from_value(json!({"concluir": "true"})).unwrap();
        assert_eq!(record, IntakeRecord::new(None, None, true));

        let record: IntakeRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record, IntakeRecord::default());
    }

    #[test]
    fn blank_name_is_not_a_name() {
        let record = IntakeRecord::new(Some("   ".into()), Some(30), true);
        assert!(!record.has_name());
        assert!(!record.is_complete());
    }

    #[test]
    fn grounding_keeps_values_present_in_text() {
        let record = IntakeRecord::new(Some("Ana".into()), Some(22), true)
            .grounded_in("meu nome é ana, tenho 22 anos, concluir");
        assert_eq!(record.name.as_deref(), Some("Ana"));
        assert_eq!(record.age, Some(22));
    }

    #[test]
    fn grounding_drops_fabricated_values() {
        let record = IntakeRecord::new(Some("Maria".into()), Some(35), true).grounded_in("concluir");
        assert_eq!(record, IntakeRecord::new(None, None, true));
    }

    #[test]
    fn grounding_requires_whole_number_for_age() {
        let record = IntakeRecord::new(None, Some(2), false).grounded_in("tenho 22 anos");
        assert_eq!(record.age, None);
    }

    proptest! {
        #[test]
        fn coerce_age_text_never_exceeds_max(text in "\\PC{0,64}") {
            if let Some(age) = coerce_age_text(&text) {
                prop_assert!(age <= MAX_AGE);
            }
        }

        #[test]
        fn coerce_age_text_finds_embedded_valid_age(age in 0u8..=MAX_AGE, word in "[a-z]{1,10}") {
            let text = format!("{} {} anos", word, age);
            prop_assert_eq!(coerce_age_text(&text), Some(age));
        }
    }
}
