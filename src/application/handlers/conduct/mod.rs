//! Conduct handlers - creation, membership, supervisor commands and idle
//! deactivation.

mod clear_commands;
mod create_conduct;
mod deactivate_idle_conducts;
mod join_conduct;
mod remove_participant;
mod toggle_cut_off;

pub use clear_commands::ClearConductCommandsHandler;
pub use create_conduct::{CreateConductCommand, CreateConductHandler};
pub use deactivate_idle_conducts::DeactivateIdleConductsHandler;
pub use join_conduct::{JoinConductCommand, JoinConductHandler, JoinConductResult};
pub use remove_participant::RemoveParticipantHandler;
pub use toggle_cut_off::ToggleCutOffHandler;

use crate::domain::conduct::{ConductError, Participant, ParticipantRole};
use crate::domain::cycle::CycleError;
use crate::domain::foundation::UserId;
use crate::ports::ConductRegistry;

/// Maps a failed cycle reset onto the conduct error taxonomy.
fn reset_failed(err: CycleError) -> ConductError {
    match err {
        CycleError::ParticipantNotFound(user_id) => ConductError::ParticipantNotFound(user_id),
        CycleError::PersistenceFailure(inner) => ConductError::from(inner),
        other => ConductError::infrastructure(other.to_string()),
    }
}

/// Loads a participant and checks they are their conduct's conducting body.
async fn find_supervisor(
    registry: &dyn ConductRegistry,
    user_id: UserId,
) -> Result<Participant, ConductError> {
    let supervisor = registry
        .find_participant(&user_id)
        .await?
        .ok_or(ConductError::ParticipantNotFound(user_id))?;
    if supervisor.role != ParticipantRole::ConductingBody {
        return Err(ConductError::NotConductingBody(user_id));
    }
    Ok(supervisor)
}
