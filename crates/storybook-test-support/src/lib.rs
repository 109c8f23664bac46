//! Shared test mocks and utilities for the storybook scene engine.

mod clock;
mod stage;

pub use clock::{FixedClock, fixed_clock};
pub use stage::{RecordingStage, StageCommand};

use std::time::Duration;

/// Shorthand for a duration in fractional seconds.
#[must_use]
pub fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value)
}
