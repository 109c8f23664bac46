//! The recognition gate.

use storybook_core::signal::{RecognitionEvent, TrackingState};
use tracing::debug;

use super::events::GateTransition;

/// Debounces tracking status for one image target.
///
/// At most one `FoundOnce` is emitted per episode; `Lost` is emitted only
/// after a `FoundOnce` and only once.
#[derive(Debug, Clone)]
pub struct RecognitionGate {
    target_id: String,
    accept_limited: bool,
    has_fired_found: bool,
}

impl RecognitionGate {
    /// Creates a gate for `target_id` that treats `Limited` as tracked.
    #[must_use]
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            accept_limited: true,
            has_fired_found: false,
        }
    }

    /// Sets whether `Limited` tracking is enough to start an episode.
    #[must_use]
    pub fn with_limited_tracking(mut self, accept: bool) -> Self {
        self.accept_limited = accept;
        self
    }

    /// Returns the target this gate listens to.
    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Returns `true` between a `FoundOnce` and the following `Lost`.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.has_fired_found
    }

    /// Feeds one tracker status change through the gate.
    pub fn observe(&mut self, event: &RecognitionEvent) -> Option<GateTransition> {
        if event.target_id != self.target_id {
            debug!(
                gate = %self.target_id,
                target_id = %event.target_id,
                "ignoring status for another target"
            );
            return None;
        }

        match event.state {
            TrackingState::Lost => {
                if self.has_fired_found {
                    self.has_fired_found = false;
                    Some(GateTransition::Lost)
                } else {
                    None
                }
            }
            TrackingState::Limited if !self.accept_limited => None,
            TrackingState::Tracked | TrackingState::ExtendedTracked | TrackingState::Limited => {
                if self.has_fired_found {
                    debug!(target_id = %self.target_id, state = ?event.state, "duplicate tracking status suppressed");
                    None
                } else {
                    self.has_fired_found = true;
                    Some(GateTransition::FoundOnce)
                }
            }
        }
    }

    /// Returns the gate to its initial, not-found state.
    pub fn reset(&mut self) {
        self.has_fired_found = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(state: TrackingState) -> RecognitionEvent {
        RecognitionEvent::new("page3", state)
    }

    #[test]
    fn test_first_tracked_status_fires_found_once() {
        let mut gate = RecognitionGate::new("page3");

        let transition = gate.observe(&event(TrackingState::Tracked));

        assert_eq!(transition, Some(GateTransition::FoundOnce));
        assert!(gate.is_found());
    }

    #[test]
    fn test_repeated_tracking_statuses_are_suppressed() {
        let mut gate = RecognitionGate::new("page3");
        gate.observe(&event(TrackingState::Tracked));

        assert_eq!(gate.observe(&event(TrackingState::Tracked)), None);
        assert_eq!(gate.observe(&event(TrackingState::ExtendedTracked)), None);
        assert_eq!(gate.observe(&event(TrackingState::Limited)), None);
    }

    #[test]
    fn test_lost_before_found_is_ignored() {
        let mut gate = RecognitionGate::new("page3");

        assert_eq!(gate.observe(&event(TrackingState::Lost)), None);
        assert!(!gate.is_found());
    }

    #[test]
    fn test_lost_fires_once_and_rearms_the_gate() {
        let mut gate = RecognitionGate::new("page3");
        gate.observe(&event(TrackingState::ExtendedTracked));

        assert_eq!(
            gate.observe(&event(TrackingState::Lost)),
            Some(GateTransition::Lost)
        );
        assert_eq!(gate.observe(&event(TrackingState::Lost)), None);
        assert_eq!(
            gate.observe(&event(TrackingState::Limited)),
            Some(GateTransition::FoundOnce)
        );
    }

    #[test]
    fn test_limited_is_ignored_when_policy_rejects_it() {
        let mut gate = RecognitionGate::new("page3").with_limited_tracking(false);

        assert_eq!(gate.observe(&event(TrackingState::Limited)), None);
        assert_eq!(
            gate.observe(&event(TrackingState::Tracked)),
            Some(GateTransition::FoundOnce)
        );
        // Degraded tracking mid-episode is not a loss.
        assert_eq!(gate.observe(&event(TrackingState::Limited)), None);
        assert!(gate.is_found());
    }

    #[test]
    fn test_other_targets_are_ignored() {
        let mut gate = RecognitionGate::new("page3");

        let transition = gate.observe(&RecognitionEvent::new("page4", TrackingState::Tracked));

        assert_eq!(transition, None);
        assert!(!gate.is_found());
    }

    #[test]
    fn test_reset_clears_found_state_without_emitting() {
        let mut gate = RecognitionGate::new("page3");
        gate.observe(&event(TrackingState::Tracked));

        gate.reset();

        assert!(!gate.is_found());
        assert_eq!(gate.observe(&event(TrackingState::Lost)), None);
    }

    #[test]
    fn test_transition_serializes_snake_case() {
        let json = serde_json::to_string(&GateTransition::FoundOnce).unwrap();
        assert_eq!(json, "\"found_once\"");
    }
}
