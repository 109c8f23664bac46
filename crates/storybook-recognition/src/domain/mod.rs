//! Domain model for recognition gating.

pub mod events;
pub mod gate;
