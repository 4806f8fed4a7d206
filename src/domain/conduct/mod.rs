//! Conduct module - exercises, their PINs and participants.

mod aggregate;
mod errors;
mod participant;
mod pin;

pub use aggregate::{Conduct, ConductStatus, CutOff, MAX_CONDUCT_NAME_LENGTH};
pub use errors::ConductError;
pub use participant::{Participant, ParticipantRole, MAX_PARTICIPANT_NAME_LENGTH};
pub use pin::{Pin, MAX_PIN_LENGTH, MIN_PIN_LENGTH};
