//! Destinations for emitted events.

use kidcode_types::Event;

/// Receives events in the order the evaluator produces them.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Event) {
        (**self).emit(event);
    }
}

/// An [`EventSink`] that hands every event to a closure.
pub struct FnSink<F>(pub F);

impl<F: FnMut(Event)> EventSink for FnSink<F> {
    fn emit(&mut self, event: Event) {
        (self.0)(event);
    }
}

/// Wrap a closure as an [`EventSink`].
pub fn from_fn<F: FnMut(Event)>(f: F) -> FnSink<F> {
    FnSink(f)
}
