//! Shared contract implemented by every noise classifier.

use crate::event::Event;

/// A streaming, stateful noise classifier over change-detection events.
///
/// Implementations decide each event using only state derived from strictly
/// prior events, then update their own state. The decision for event `i`
/// never depends on event `i` itself or on any event after it.
pub trait Denoiser {
    /// Classify one event as signal (`true`) or noise (`false`), updating
    /// internal state as a side effect.
    fn evaluate(&mut self, event: Event) -> bool;

    /// Reset to the state immediately following construction. Idempotent.
    fn initialize(&mut self);

    /// Classify a whole sequence, returning the order-preserving
    /// subsequence retained as signal.
    ///
    /// Every event is offered to [`Denoiser::evaluate`] in order, including
    /// ones that end up dropped: later decisions in most filters depend on
    /// having observed the dropped events too, so this must never
    /// short-circuit on a negative decision.
    fn process_events(&mut self, events: &[Event]) -> Vec<Event> {
        events
            .iter()
            .copied()
            .filter(|event| self.evaluate(*event))
            .collect()
    }
}
