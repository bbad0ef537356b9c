//! Domain validation errors.

use thiserror::Error;

/// Rejected input when building a domain value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("{field} must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let blank = ValidationError::Blank { field: "session_id" };
        assert_eq!(blank.to_string(), "session_id must not be blank");

        let range = ValidationError::OutOfRange {
            field: "chunk_overlap",
            min: 0,
            max: 99,
            actual: 100,
        };
        assert_eq!(
            range.to_string(),
            "chunk_overlap must be between 0 and 99, got 100"
        );
    }
}
