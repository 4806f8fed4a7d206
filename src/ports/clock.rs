//! Clock port - injectable time source.
//!
//! Everything that stamps events or decides whether a deadline is due asks a
//! `Clock`, so tests can drive time by hand.

use std::fmt;

use crate::domain::foundation::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Timestamp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Clock) {}
}
