//! Storybook player — plays a book against a scripted input timeline.
//!
//! The player stands in for the AR host: it feeds recognition and
//! interaction signals from a YAML script at their timestamps and drives
//! the book with fixed-step ticks, logging every stage command and scene
//! event.

pub mod config;
pub mod error;
pub mod runner;
pub mod script;
pub mod stage;
