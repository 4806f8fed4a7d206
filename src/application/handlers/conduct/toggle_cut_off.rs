//! ToggleCutOffHandler - starts or lifts a conduct's cut-off.
//!
//! Starting cut-off stops every trainer's cycle and blocks new work until it
//! is lifted. Lifting it sends every trainer into a mandatory rest for the
//! strictest zone's rest duration.

use std::sync::Arc;

use tracing::info;

use super::{find_supervisor, reset_failed};
use crate::application::handlers::cycle::{AuditLogWriter, CycleCoordinator};
use crate::domain::audit::{ActivityAction, ActivityDraft, ActivityNote};
use crate::domain::conduct::{ConductError, CutOff, ParticipantRole};
use crate::domain::cycle::{CycleEvent, ResetReason};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, ConductRegistry};

pub struct ToggleCutOffHandler {
    registry: Arc<dyn ConductRegistry>,
    coordinator: Arc<CycleCoordinator>,
    audit: Arc<AuditLogWriter>,
    clock: Arc<dyn Clock>,
}

impl ToggleCutOffHandler {
    pub fn new(
        registry: Arc<dyn ConductRegistry>,
        coordinator: Arc<CycleCoordinator>,
        audit: Arc<AuditLogWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            coordinator,
            audit,
            clock,
        }
    }

    /// Toggles cut-off for the supervisor's conduct and returns the new state.
    ///
    /// The conduct is updated before the trainers, so no trainer can start
    /// work between their reset and the cut-off taking effect.
    ///
    /// # Errors
    ///
    /// - `ParticipantNotFound` if the supervisor is not registered
    /// - `NotConductingBody` if they are a trainer
    /// - `NotFound` / `Inactive` if their conduct is gone or deactivated
    pub async fn handle(&self, supervisor_id: UserId) -> Result<CutOff, ConductError> {
        let supervisor = find_supervisor(self.registry.as_ref(), supervisor_id).await?;
        let mut conduct = self
            .registry
            .find_by_id(&supervisor.conduct_id)
            .await?
            .ok_or(ConductError::NotFound(supervisor.conduct_id))?;
        if !conduct.is_active() {
            return Err(ConductError::Inactive(conduct.id()));
        }

        let now = self.clock.now();
        let rest = self.coordinator.machine().zones().strictest().rest();
        let cut_off = conduct.toggle_cut_off(now, rest);
        conduct.touch(now);
        self.registry.update_conduct(&conduct).await?;

        let trainers: Vec<UserId> = self
            .registry
            .list_participants(&conduct.id())
            .await?
            .into_iter()
            .filter(|p| p.role == ParticipantRole::Trainer)
            .map(|p| p.user_id)
            .collect();

        for user_id in &trainers {
            let event = if cut_off.is_active() {
                CycleEvent::ManualReset {
                    user_id: *user_id,
                    reason: ResetReason::CutOff,
                    at: now,
                }
            } else {
                CycleEvent::MandatoryRest {
                    user_id: *user_id,
                    at: now,
                }
            };
            self.coordinator
                .handle_event(event)
                .await
                .map_err(reset_failed)?;
        }

        let note = match cut_off.mandatory_rest_until() {
            Some(until) => ActivityNote::new(
                ActivityAction::CutOffLifted,
                None,
                format!("Cut-off lifted, mandatory rest until {}", until),
            ),
            None => ActivityNote::new(
                ActivityAction::CutOffStarted,
                None,
                "Cut-off started, all trainer cycles stopped",
            ),
        };
        self.audit
            .append(ActivityDraft::from_note(
                conduct.id(),
                supervisor.user_id,
                supervisor.name.clone(),
                note,
                now,
            ))
            .await?;

        info!(
            conduct_id = %conduct.id(),
            supervisor_id = %supervisor_id,
            active = cut_off.is_active(),
            trainers = trainers.len(),
            "Conduct cut-off toggled"
        );
        Ok(cut_off)
    }
}
