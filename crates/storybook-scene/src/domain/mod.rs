//! Domain layer for scene composition.

pub mod config;
pub mod events;
pub mod phase;
