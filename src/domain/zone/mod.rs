//! Zone module - heat-hazard zones and their policies.
//!
//! - `ZoneId` - case-insensitive zone identifier
//! - `ZonePolicyTable` - zone → work duration, rest duration, stringency rank
//! - `most_stringent` - the Stringency Resolver used while a user works

mod policy;
mod stringency;
mod zone_id;

pub use policy::{UnknownZone, ZoneConfigError, ZonePolicy, ZonePolicyTable, ZoneSpec, MAX_WORK_MINUTES};
pub use stringency::{most_stringent, most_stringent_of};
pub use zone_id::{ZoneId, MAX_ZONE_ID_LENGTH};
