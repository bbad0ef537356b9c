//! Declared transitions for lifecycle enums.

use super::ValidationError;

/// A status enum with an explicit set of legal moves.
///
/// Implementors list their outgoing edges; checking and terminal
/// detection are derived from that list.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::IllegalTransition {
            from: format!("{:?}", self),
            to: format!("{:?}", target),
        })
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
