//! Storybook — idle watchdog.
//!
//! A tick-driven countdown that fires a single nudge when the player has
//! been idle for too long after gameplay starts.

pub mod domain;

pub use domain::policy::IdlePolicy;
pub use domain::watchdog::{IdleWatchdog, WatchdogState};
