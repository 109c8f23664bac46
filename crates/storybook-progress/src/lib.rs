//! Storybook — collection progress.
//!
//! Tracks collected-versus-required counts per collectible category and
//! reports overall completion exactly once per configuration.

pub mod domain;

pub use domain::accumulator::ProgressAccumulator;
pub use domain::events::ProgressEvent;
pub use domain::goals::{CategoryGoals, CollectibleCategory, CollectibleItem, normalize_category};
