//! CreateConductHandler - Command handler for creating conducts.
//!
//! PINs are drawn at random and checked by the registry's uniqueness
//! constraint; a conflict draws a new PIN, up to the configured attempts.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::conduct::{Conduct, ConductError};
use crate::domain::foundation::CompanyId;
use crate::ports::{Clock, ConductRegistry, PinGenerator, PinInsertOutcome};

/// Command to create a new conduct.
#[derive(Debug, Clone)]
pub struct CreateConductCommand {
    pub company_id: CompanyId,
    pub name: String,
}

/// Handler for creating conducts.
pub struct CreateConductHandler {
    registry: Arc<dyn ConductRegistry>,
    pins: Arc<dyn PinGenerator>,
    clock: Arc<dyn Clock>,
    pin_length: usize,
    max_attempts: u32,
}

impl CreateConductHandler {
    pub fn new(
        registry: Arc<dyn ConductRegistry>,
        pins: Arc<dyn PinGenerator>,
        clock: Arc<dyn Clock>,
        pin_length: usize,
        max_attempts: u32,
    ) -> Self {
        Self {
            registry,
            pins,
            clock,
            pin_length,
            max_attempts,
        }
    }

    pub async fn handle(&self, cmd: CreateConductCommand) -> Result<Conduct, ConductError> {
        let first_pin = self.pins.generate(self.pin_length)?;
        let mut conduct = Conduct::new(cmd.company_id, &cmd.name, first_pin, self.clock.now())?;

        for attempt in 1..=self.max_attempts {
            match self.registry.insert_conduct(&conduct).await? {
                PinInsertOutcome::Inserted => {
                    info!(
                        conduct_id = %conduct.id(),
                        company_id = %conduct.company_id(),
                        attempt,
                        "Conduct created"
                    );
                    return Ok(conduct);
                }
                PinInsertOutcome::PinTaken => {
                    debug!(attempt, "PIN already in use, drawing another");
                    if attempt < self.max_attempts {
                        conduct = conduct.with_pin(self.pins.generate(self.pin_length)?);
                    }
                }
            }
        }

        Err(ConductError::PinExhausted {
            attempts: self.max_attempts,
        })
    }
}
