//! View Attachment
//!
//! Tracks which view, if any, a view model is currently bound to, and
//! broadcasts every change. At most one view is attached at a time:
//! attaching a view detaches the previous one first.
//!
//! The channel keeps only a weak reference to the attached view. The host
//! owns views and decides when they are dropped.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::event::View;
use crate::stream::{Observable, Observer, Subject};

/// Broadcasts the currently attached view, or `None` after a detach.
pub struct ViewAttachment<V: View> {
    changes: Subject<Option<Arc<V>>>,
    current: Arc<RwLock<Option<Weak<V>>>>,
}

impl<V: View> ViewAttachment<V> {
    pub fn new() -> Self {
        Self {
            changes: Subject::new(),
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Record `view` as current and broadcast it.
    ///
    /// A previously attached view is detached first. No-op once the
    /// channel is completed.
    pub fn attach(&self, view: Arc<V>) {
        if self.changes.is_completed() {
            tracing::debug!(channel = self.changes.id(), "ignoring attach on completed channel");
            return;
        }

        if self.current.read().is_some() {
            self.detach();
        }

        *self.current.write() = Some(Arc::downgrade(&view));
        tracing::debug!(channel = self.changes.id(), "attach view");
        self.changes.next(Some(view));
    }

    /// Clear the current view and broadcast `None`.
    pub fn detach(&self) {
        if self.changes.is_completed() {
            return;
        }

        *self.current.write() = None;
        tracing::debug!(channel = self.changes.id(), "detach view");
        self.changes.next(None);
    }

    /// The attached view, if one is attached and the host still holds it.
    pub fn current(&self) -> Option<Arc<V>> {
        self.current.read().as_ref().and_then(Weak::upgrade)
    }

    /// Attachment changes from now on. No history is replayed.
    pub fn current_view(&self) -> Observable<Option<Arc<V>>> {
        self.changes.observe()
    }

    /// Like [`current_view`](Self::current_view), but each subscriber first
    /// receives the view attached at the moment it subscribes, if any.
    pub fn attached_views(&self) -> Observable<Option<Arc<V>>> {
        let changes = self.changes.observe();
        let current = Arc::clone(&self.current);

        Observable::new(move |observer: Observer<Option<Arc<V>>>| {
            let attached = current.read().as_ref().and_then(Weak::upgrade);
            let subscription = changes.subscribe_with(observer.clone());
            if let Some(view) = attached {
                observer.next(Some(view));
            }
            subscription
        })
    }

    /// Close the channel, completing every stream derived from it.
    pub fn complete(&self) {
        *self.current.write() = None;
        self.changes.complete();
    }

    pub fn is_completed(&self) -> bool {
        self.changes.is_completed()
    }
}

impl<V: View> Default for ViewAttachment<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: View> fmt::Debug for ViewAttachment<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewAttachment")
            .field("channel", &self.changes)
            .field("attached", &self.current().is_some())
            .finish()
    }
}
