//! Random PIN source.

use crate::domain::conduct::Pin;
use crate::domain::foundation::ValidationError;
use crate::ports::PinGenerator;

/// Draws PINs from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPinGenerator;

impl PinGenerator for RandomPinGenerator {
    fn generate(&self, length: usize) -> Result<Pin, ValidationError> {
        Pin::random(&mut rand::thread_rng(), length)
    }
}
