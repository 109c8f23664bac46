//! Domain model for the idle watchdog.

pub mod policy;
pub mod watchdog;
