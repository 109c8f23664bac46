//! Storybook — recognition gating.
//!
//! Turns the tracker's noisy per-frame status stream into two clean edges
//! per recognition episode: one `FoundOnce` and one `Lost`.

pub mod domain;

pub use domain::events::GateTransition;
pub use domain::gate::RecognitionGate;
