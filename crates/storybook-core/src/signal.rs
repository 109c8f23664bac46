//! Inbound signal abstractions.
//!
//! Signals are produced by external collaborators (the image tracker and
//! the tap/drag hit-testers) and consumed by scene controllers.

use serde::{Deserialize, Serialize};

/// Trait that all inbound signals implement.
pub trait Signal: Send + Sync + std::fmt::Debug {
    /// The type name for this signal (for logging/routing).
    fn signal_type(&self) -> &'static str;
}

/// Tracking status reported by the image tracker for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// The target is fully tracked.
    Tracked,
    /// The target left the camera view but its pose is still estimated.
    ExtendedTracked,
    /// The target is tracked with degraded quality.
    Limited,
    /// The target is no longer tracked.
    Lost,
}

impl TrackingState {
    /// Returns `true` for every state other than `Lost`.
    #[must_use]
    pub fn is_tracking(self) -> bool {
        !matches!(self, Self::Lost)
    }
}

/// A tracking status change for one image target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionEvent {
    /// The image target the status refers to.
    pub target_id: String,
    /// The reported tracking state.
    pub state: TrackingState,
}

impl RecognitionEvent {
    /// Creates a recognition event.
    #[must_use]
    pub fn new(target_id: impl Into<String>, state: TrackingState) -> Self {
        Self {
            target_id: target_id.into(),
            state,
        }
    }
}

impl Signal for RecognitionEvent {
    fn signal_type(&self) -> &'static str {
        "signal.recognition"
    }
}

/// A successful player action against a collectible item, reported once
/// per tap or completed drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSignal {
    /// The collectible category the item belongs to.
    pub category: String,
    /// The item the player acted on.
    pub item_id: String,
}

impl InteractionSignal {
    /// Creates an interaction signal.
    #[must_use]
    pub fn new(category: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            item_id: item_id.into(),
        }
    }
}

impl Signal for InteractionSignal {
    fn signal_type(&self) -> &'static str {
        "signal.interaction"
    }
}
