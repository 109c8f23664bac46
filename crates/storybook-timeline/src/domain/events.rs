//! Events produced by the sequencer.

use serde::{Deserialize, Serialize};

use super::run::RunHandle;
use super::step::StepKind;

/// Progress notifications for a sequence run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEvent {
    /// A step's side effects have been issued.
    StepEntered {
        /// The run the step belongs to.
        handle: RunHandle,
        /// Zero-based step index.
        index: usize,
        /// The step's kind.
        kind: StepKind,
    },
    /// Every step of the run has finished.
    RunCompleted {
        /// The completed run.
        handle: RunHandle,
    },
    /// The run was cancelled before finishing.
    RunCancelled {
        /// The cancelled run.
        handle: RunHandle,
        /// The step that was active when the run was cancelled.
        at_step: usize,
    },
}
