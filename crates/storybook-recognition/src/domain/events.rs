//! Edge events produced by the recognition gate.

use serde::{Deserialize, Serialize};

/// An edge in a target's recognition episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateTransition {
    /// The target was recognized for the first time in this episode.
    FoundOnce,
    /// The target recognized earlier in this episode was lost.
    Lost,
}
