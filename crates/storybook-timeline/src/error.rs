//! Timeline error types.

use thiserror::Error;

use crate::domain::run::RunHandle;

/// Errors returned by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// A run is already in progress; a new one cannot start until it
    /// completes or is cancelled.
    #[error("run {0} is still in progress")]
    RunInProgress(RunHandle),
}
