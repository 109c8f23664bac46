//! Storybook Core — shared abstractions for the scene engine.
//!
//! This crate defines the traits and types that every scene component
//! depends on: the clock, the event envelope, inbound signals and the
//! collaborator ports through which scenes drive audio, subtitles and
//! animation. It contains no host or rendering code.

pub mod clock;
pub mod error;
pub mod event;
pub mod outbox;
pub mod signal;
pub mod stage;
