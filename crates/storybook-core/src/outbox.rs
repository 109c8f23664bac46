//! Event outbox abstraction.

use crate::event::DomainEvent;

/// Trait for components that record the events they produce until the
/// host collects them.
pub trait EventOutbox {
    /// The event type this component produces.
    type Event: DomainEvent;

    /// Returns the identifier of the event stream (the scene id).
    fn stream_id(&self) -> &str;

    /// Returns events recorded since the last collection.
    fn pending_events(&self) -> &[Self::Event];

    /// Clears the recorded events.
    fn clear_pending_events(&mut self);

    /// Removes and returns the recorded events.
    fn take_pending_events(&mut self) -> Vec<Self::Event>
    where
        Self::Event: Clone,
    {
        let events = self.pending_events().to_vec();
        self.clear_pending_events();
        events
    }
}
