//! Cancellable subscriptions.
//!
//! A Subscription represents one active binding between a stream and a
//! consumer. Cancelling it runs every teardown action attached to it exactly
//! once; cancelling again does nothing.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

/// Unique identifier for a subscription.
///
/// Subjects use it to find the observer slot to remove when the
/// subscription is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

type Teardown = Box<dyn FnOnce() + Send>;

struct Inner {
    id: SubscriptionId,
    cancelled: AtomicBool,
    /// Most subscriptions carry one or two teardowns (the upstream handle
    /// and, for operators, the notifier handle).
    teardowns: Mutex<SmallVec<[Teardown; 2]>>,
}

/// Handle to an active stream-to-consumer binding.
///
/// Clones share state: cancelling any clone cancels them all. Dropping a
/// handle does not cancel it.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// Create a live subscription with no teardown actions.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                id: SubscriptionId::new(),
                cancelled: AtomicBool::new(false),
                teardowns: Mutex::new(SmallVec::new()),
            }),
        }
    }

    /// Create a subscription that runs `teardown` when cancelled.
    pub fn from_teardown<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let subscription = Self::new();
        subscription.add_teardown(teardown);
        subscription
    }

    /// Create a subscription that is already cancelled.
    ///
    /// Returned by streams that finish during `subscribe`.
    pub fn cancelled() -> Self {
        let subscription = Self::new();
        subscription.inner.cancelled.store(true, Ordering::SeqCst);
        subscription
    }

    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Attach an action to run on cancellation.
    ///
    /// If the subscription is already cancelled the action runs immediately.
    pub fn add_teardown<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut teardowns = self.inner.teardowns.lock();
            // Checked under the lock so a concurrent cancel either drains
            // this action or we see its flag.
            if !self.inner.cancelled.load(Ordering::SeqCst) {
                teardowns.push(Box::new(teardown));
                return;
            }
        }
        teardown();
    }

    /// Cancel `child` together with this subscription.
    pub fn add(&self, child: Subscription) {
        self.add_teardown(move || child.cancel());
    }

    /// Stop delivery and run the teardown actions.
    ///
    /// Idempotent: only the first call has an effect.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        let teardowns = std::mem::take(&mut *self.inner.teardowns.lock());
        for teardown in teardowns {
            teardown();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn subscription_ids_are_unique() {
        let id1 = SubscriptionId::new();
        let id2 = SubscriptionId::new();
        let id3 = SubscriptionId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn cancel_runs_teardown_once() {
        let count = Arc::new(AtomicI32::new(0));
        let count_clone = count.clone();

        let subscription = Subscription::from_teardown(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!subscription.is_cancelled());
        subscription.cancel();
        subscription.cancel();

        assert!(subscription.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_cancellation() {
        let subscription = Subscription::new();
        let clone = subscription.clone();

        clone.cancel();
        assert!(subscription.is_cancelled());
        assert_eq!(subscription.id(), clone.id());
    }

    #[test]
    fn teardown_added_after_cancel_runs_immediately() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();

        let subscription = Subscription::cancelled();
        subscription.add_teardown(move || ran_clone.store(true, Ordering::SeqCst));

        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn child_is_cancelled_with_parent() {
        let parent = Subscription::new();
        let child = Subscription::new();
        parent.add(child.clone());

        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn dropping_does_not_cancel() {
        let count = Arc::new(AtomicI32::new(0));
        let count_clone = count.clone();

        let subscription = Subscription::from_teardown(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        drop(subscription);

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
