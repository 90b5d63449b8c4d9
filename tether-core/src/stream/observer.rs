//! Observers: the receiving end of a stream.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single notification delivered to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event<T> {
    /// The next element of the stream.
    Next(T),
    /// The stream finished. Nothing follows this event.
    Completed,
}

/// Receives events from a stream.
///
/// An observer enforces the stream grammar on behalf of every producer:
/// after `complete` it drops further elements, and completion itself is
/// delivered at most once. Clones share that state.
pub struct Observer<T> {
    handler: Arc<dyn Fn(Event<T>) + Send + Sync>,
    closed: Arc<AtomicBool>,
}

impl<T> Observer<T> {
    /// Create an observer from an event handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Event<T>) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deliver an element, unless the observer is already closed.
    pub fn next(&self, value: T) {
        if !self.is_closed() {
            (self.handler)(Event::Next(value));
        }
    }

    /// Deliver completion. Only the first call reaches the handler.
    pub fn complete(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            (self.handler)(Event::Completed);
        }
    }

    /// Forward an event to `next` or `complete`.
    pub fn emit(&self, event: Event<T>) {
        match event {
            Event::Next(value) => self.next(value),
            Event::Completed => self.complete(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("closed", &self.is_closed())
            .finish()
    }
}
