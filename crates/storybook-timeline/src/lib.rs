//! Storybook — timeline sequencing.
//!
//! Executes an ordered list of narration, animation and wait steps against
//! the scene's collaborators. Waiting is data: each run holds a step cursor
//! and the time spent in the current step, advanced only by host ticks, so
//! a run can be cancelled between any two ticks without leaving a
//! suspended task behind.

pub mod domain;
pub mod error;

pub use domain::events::TimelineEvent;
pub use domain::run::{RunHandle, RunStatus, SequenceRun};
pub use domain::sequencer::{SequencerConfig, TimelineSequencer};
pub use domain::step::{
    AudioCue, DurationSource, Narration, Reveal, ResolvedDuration, StepKind, StepList,
    TimelineStep,
};
pub use error::TimelineError;
