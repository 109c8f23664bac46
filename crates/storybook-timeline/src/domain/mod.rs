//! Domain model for timeline sequencing.

pub mod events;
pub mod run;
pub mod sequencer;
pub mod step;
pub mod typewriter;
