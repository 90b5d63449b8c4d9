//! External signal channels.
//!
//! The host delivers results and incoming navigation intents through these
//! channels whether or not a view is attached. Subscribers already listening
//! receive every payload; a subscriber that arrives after a push never sees
//! it.

use std::fmt;

use crate::stream::{Observable, Subject};

/// A named broadcast channel for payloads injected by the host.
pub struct SignalChannel<T> {
    name: &'static str,
    subject: Subject<T>,
}

impl<T> SignalChannel<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subject: Subject::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Broadcast `payload` to current subscribers.
    ///
    /// Dropped once the channel is closed.
    pub fn push(&self, payload: T) {
        if self.subject.is_completed() {
            tracing::trace!(channel = self.name, "dropping payload pushed after close");
            return;
        }
        self.subject.next(payload);
    }

    /// Payloads pushed from now on. Completes when the channel closes.
    pub fn stream(&self) -> Observable<T> {
        self.subject.observe()
    }

    pub fn close(&self) {
        self.subject.complete();
    }

    pub fn is_closed(&self) -> bool {
        self.subject.is_completed()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subject.subscriber_count()
    }
}

impl<T> fmt::Debug for SignalChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalChannel")
            .field("name", &self.name)
            .field("subject", &self.subject)
            .finish()
    }
}
