//! Conduct-specific error types.

use crate::domain::foundation::{ConductId, DomainError, ErrorCode, UserId, ValidationError};

/// Errors from conduct registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConductError {
    /// No conduct with this id.
    NotFound(ConductId),

    /// No conduct uses this PIN.
    PinNotFound(String),

    /// The conduct was deactivated.
    Inactive(ConductId),

    /// The participant is not registered in this conduct.
    ParticipantNotFound(UserId),

    /// Only the conducting body may issue conduct-wide commands.
    NotConductingBody(UserId),

    /// Every PIN drawn collided with an existing conduct.
    PinExhausted { attempts: u32 },

    ValidationFailed { field: String, message: String },

    Infrastructure(String),
}

impl ConductError {
    pub fn pin_not_found(pin: impl Into<String>) -> Self {
        ConductError::PinNotFound(pin.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConductError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ConductError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ConductError::NotFound(_) | ConductError::PinNotFound(_) => ErrorCode::ConductNotFound,
            ConductError::Inactive(_) => ErrorCode::ConductInactive,
            ConductError::ParticipantNotFound(_) => ErrorCode::ParticipantNotFound,
            ConductError::NotConductingBody(_) => ErrorCode::PermissionDenied,
            ConductError::PinExhausted { .. } => ErrorCode::PinExhausted,
            ConductError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ConductError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConductError::NotFound(id) => format!("Conduct not found: {}", id),
            ConductError::PinNotFound(pin) => format!("No conduct found for PIN {}", pin),
            ConductError::Inactive(id) => format!("Conduct {} is inactive", id),
            ConductError::ParticipantNotFound(user_id) => {
                format!("Participant not found: {}", user_id)
            }
            ConductError::NotConductingBody(user_id) => {
                format!("User {} is not the conducting body", user_id)
            }
            ConductError::PinExhausted { attempts } => {
                format!("No free PIN found after {} attempts", attempts)
            }
            ConductError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ConductError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ConductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConductError {}

impl From<DomainError> for ConductError {
    fn from(err: DomainError) -> Self {
        if err.code.is_validation() {
            ConductError::ValidationFailed {
                field: err.field.unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            }
        } else {
            ConductError::Infrastructure(err.to_string())
        }
    }
}

impl From<ValidationError> for ConductError {
    fn from(err: ValidationError) -> Self {
        ConductError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ConductError> for DomainError {
    fn from(err: ConductError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
