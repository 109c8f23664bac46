//! Domain model for collection progress.

pub mod accumulator;
pub mod events;
pub mod goals;
