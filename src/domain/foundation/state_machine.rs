//! Lifecycle statuses with a declared set of legal moves.

use super::ValidationError;

/// A status enum whose legal successors are a fixed table.
///
/// Implement `successors`; `transition_to` rejects anything not listed.
/// A status with no successors is terminal.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "status",
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}
