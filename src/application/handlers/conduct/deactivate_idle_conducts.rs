//! DeactivateIdleConductsHandler - retires empty conducts nobody touched
//! within the inactivity window.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{error, info};

use crate::application::handlers::cycle::AuditLogWriter;
use crate::domain::audit::{ActivityAction, ActivityDraft};
use crate::domain::conduct::ConductError;
use crate::domain::foundation::ConductId;
use crate::ports::{Clock, ConductRegistry};

pub struct DeactivateIdleConductsHandler {
    registry: Arc<dyn ConductRegistry>,
    audit: Arc<AuditLogWriter>,
    clock: Arc<dyn Clock>,
    inactivity_hours: u32,
}

impl DeactivateIdleConductsHandler {
    pub fn new(
        registry: Arc<dyn ConductRegistry>,
        audit: Arc<AuditLogWriter>,
        clock: Arc<dyn Clock>,
        inactivity_hours: u32,
    ) -> Self {
        Self {
            registry,
            audit,
            clock,
            inactivity_hours,
        }
    }

    /// Deactivates every eligible conduct and returns their ids.
    pub async fn handle(&self) -> Result<Vec<ConductId>, ConductError> {
        let now = self.clock.now();
        let cutoff = now.plus(chrono::Duration::hours(-i64::from(self.inactivity_hours)));
        let mut deactivated = Vec::new();

        for mut conduct in self.registry.find_active_idle_since(cutoff).await? {
            if self.registry.count_participants(&conduct.id()).await? > 0 {
                continue;
            }

            conduct.deactivate()?;
            self.registry.update_conduct(&conduct).await?;
            self.audit
                .append(ActivityDraft::system(
                    conduct.id(),
                    ActivityAction::ConductDeactivated,
                    format!(
                        "Conduct deactivated after {} hours without activity",
                        self.inactivity_hours
                    ),
                    now,
                ))
                .await?;

            info!(conduct_id = %conduct.id(), "Idle conduct deactivated");
            deactivated.push(conduct.id());
        }

        Ok(deactivated)
    }

    /// Sweeps every `every` until shutdown signal is received.
    pub async fn run(&self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(every);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
                _ = interval.tick() => {
                    if let Err(err) = self.handle().await {
                        error!(error = %err, "Idle conduct sweep failed");
                    }
                }
            }
        }
    }
}
