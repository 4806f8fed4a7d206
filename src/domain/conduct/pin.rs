//! Conduct PIN value object.
//!
//! Short numeric access code shared with everyone joining an exercise.
//!
//! # Validation Rules
//!
//! - ASCII digits only, surrounding whitespace ignored
//! - 4-12 digits; deployments use 6

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

pub const MIN_PIN_LENGTH: usize = 4;
pub const MAX_PIN_LENGTH: usize = 12;

/// A validated conduct PIN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pin(String);

impl Pin {
    /// # Errors
    ///
    /// Returns `ValidationError` if the PIN is empty, has the wrong length,
    /// or contains anything but digits.
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        let pin = raw.trim();
        if pin.is_empty() {
            return Err(ValidationError::empty_field("pin"));
        }
        if pin.len() < MIN_PIN_LENGTH || pin.len() > MAX_PIN_LENGTH {
            return Err(ValidationError::out_of_range(
                "pin_length",
                MIN_PIN_LENGTH as i64,
                MAX_PIN_LENGTH as i64,
                pin.len() as i64,
            ));
        }
        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format("pin", "digits only"));
        }
        Ok(Self(pin.to_string()))
    }

    /// Draws a uniformly random PIN of `length` digits.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `length` is outside the allowed range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Result<Self, ValidationError> {
        let digits: String = (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self::try_new(&digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Pin {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}
