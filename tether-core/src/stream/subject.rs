//! Subject Implementation
//!
//! A Subject is a broadcast point: a producer pushes elements into it and
//! every observer subscribed at that moment receives them.
//!
//! # Broadcast Semantics
//!
//! 1. Elements are not replayed. An observer that subscribes late only sees
//!    elements pushed after it subscribed.
//!
//! 2. Completion is terminal. After `complete`, pushes are dropped and new
//!    observers receive completion immediately.
//!
//! 3. An observer cancelled in the middle of a dispatch receives nothing
//!    further from that dispatch.
//!
//! # Thread Safety
//!
//! The observer list is protected by a mutex, but the lock is never held
//! while observers run: a dispatch snapshots the list first. Observers may
//! therefore subscribe, cancel, or push re-entrantly.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::observable::Observable;
use super::observer::Observer;
use super::subscription::{Subscription, SubscriptionId};

/// Counter for generating unique subject IDs.
static SUBJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_subject_id() -> u64 {
    SUBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// One subscribed observer.
struct Slot<T> {
    id: SubscriptionId,
    observer: Observer<T>,
    /// Cleared on cancellation so an in-flight dispatch skips this slot.
    active: AtomicBool,
}

struct State<T> {
    slots: Vec<Arc<Slot<T>>>,
    completed: bool,
}

/// A broadcast channel without replay.
///
/// Clones share the same observer list.
pub struct Subject<T> {
    id: u64,
    state: Arc<Mutex<State<T>>>,
}

impl<T> Subject<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            id: next_subject_id(),
            state: Arc::new(Mutex::new(State {
                slots: Vec::new(),
                completed: false,
            })),
        }
    }

    /// Get the subject's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Push an element to every current observer.
    ///
    /// Dropped if the subject has completed.
    pub fn next(&self, value: T) {
        let slots = {
            let state = self.state.lock();
            if state.completed {
                return;
            }
            state.slots.clone()
        };

        for slot in slots {
            if slot.active.load(Ordering::SeqCst) {
                slot.observer.next(value.clone());
            }
        }
    }

    /// Complete every current observer and close the subject.
    pub fn complete(&self) {
        let slots = {
            let mut state = self.state.lock();
            if state.completed {
                return;
            }
            state.completed = true;
            std::mem::take(&mut state.slots)
        };

        for slot in slots {
            if slot.active.swap(false, Ordering::SeqCst) {
                slot.observer.complete();
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    /// Get the number of live observers.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// A stream of the elements pushed from now on.
    pub fn observe(&self) -> Observable<T> {
        let state = Arc::clone(&self.state);

        Observable::new(move |observer: Observer<T>| {
            let subscription = Subscription::new();
            let slot = Arc::new(Slot {
                id: subscription.id(),
                observer: observer.clone(),
                active: AtomicBool::new(true),
            });

            {
                let mut guard = state.lock();
                if guard.completed {
                    drop(guard);
                    observer.complete();
                    subscription.cancel();
                    return subscription;
                }
                guard.slots.push(Arc::clone(&slot));
            }

            let weak: Weak<Mutex<State<T>>> = Arc::downgrade(&state);
            subscription.add_teardown(move || {
                slot.active.store(false, Ordering::SeqCst);
                if let Some(state) = weak.upgrade() {
                    state.lock().slots.retain(|s| s.id != slot.id);
                }
            });

            subscription
        })
    }
}

impl<T> Default for Subject<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Subject")
            .field("id", &self.id)
            .field("subscriber_count", &state.slots.len())
            .field("completed", &state.completed)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
