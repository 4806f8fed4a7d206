//! JoinConductHandler - registers a participant through a conduct PIN.

use std::sync::Arc;

use tracing::info;

use crate::application::handlers::cycle::AuditLogWriter;
use crate::domain::audit::{ActivityAction, ActivityDraft};
use crate::domain::conduct::{Conduct, ConductError, Participant, ParticipantRole, Pin};
use crate::ports::{Clock, ConductRegistry};

/// Command to join a conduct.
#[derive(Debug, Clone)]
pub struct JoinConductCommand {
    pub pin: String,
    pub name: String,
    pub role: ParticipantRole,
}

/// Result of joining a conduct.
#[derive(Debug, Clone)]
pub struct JoinConductResult {
    pub conduct: Conduct,
    pub participant: Participant,
    /// True if a participant with the same name was already registered.
    pub rejoined: bool,
}

pub struct JoinConductHandler {
    registry: Arc<dyn ConductRegistry>,
    audit: Arc<AuditLogWriter>,
    clock: Arc<dyn Clock>,
}

impl JoinConductHandler {
    pub fn new(
        registry: Arc<dyn ConductRegistry>,
        audit: Arc<AuditLogWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            audit,
            clock,
        }
    }

    /// # Errors
    ///
    /// - `PinNotFound` if no conduct uses the PIN (or it is malformed)
    /// - `Inactive` if the conduct was deactivated
    /// - `ValidationFailed` if the name is blank or too long
    pub async fn handle(&self, cmd: JoinConductCommand) -> Result<JoinConductResult, ConductError> {
        let pin = Pin::try_new(&cmd.pin).map_err(|_| ConductError::pin_not_found(cmd.pin.trim()))?;
        let mut conduct = self
            .registry
            .find_by_pin(&pin)
            .await?
            .ok_or_else(|| ConductError::pin_not_found(pin.as_str()))?;

        if !conduct.is_active() {
            return Err(ConductError::Inactive(conduct.id()));
        }

        let now = self.clock.now();
        let name = Participant::normalize_name(&cmd.name)?;
        let (participant, rejoined) = match self
            .registry
            .find_participant_by_name(&conduct.id(), &name)
            .await?
        {
            Some(existing) => (existing, true),
            None => {
                let participant = Participant::new(conduct.id(), &name, cmd.role, now)?;
                self.registry.add_participant(&participant).await?;
                (participant, false)
            }
        };

        conduct.touch(now);
        self.registry.update_conduct(&conduct).await?;

        self.audit
            .append(ActivityDraft {
                conduct_id: conduct.id(),
                user_id: Some(participant.user_id),
                username: participant.name.clone(),
                action: ActivityAction::UserJoined,
                zone: None,
                details: Some(format!("Joined as {}", participant.role.as_str())),
                timestamp: now,
            })
            .await?;

        info!(
            conduct_id = %conduct.id(),
            user_id = %participant.user_id,
            rejoined,
            "Participant joined conduct"
        );

        Ok(JoinConductResult {
            conduct,
            participant,
            rejoined,
        })
    }
}
