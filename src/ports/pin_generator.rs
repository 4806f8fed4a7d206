//! PIN generator port.

use crate::domain::conduct::Pin;
use crate::domain::foundation::ValidationError;

/// Draws candidate PINs. Uniqueness is enforced by the registry, not here.
pub trait PinGenerator: Send + Sync {
    fn generate(&self, length: usize) -> Result<Pin, ValidationError>;
}
