//! Lifecycle Events
//!
//! A view reports its own lifecycle as a stream of [`LifecycleEvent`]s. The
//! binding operator watches that stream to decide when streams bound to the
//! view must end.
//!
//! # Terminal Events
//!
//! `Destroy` is the last event a view instance ever reports. Whether it also
//! ends the streams bound to the view depends on the view: a view destroyed
//! only to be recreated (a configuration change, for example) reports
//! `is_terminal_dismissal() == false`, and bound streams carry over to its
//! replacement.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::stream::{Observable, Subject};

/// A lifecycle transition reported by a view.
///
/// Variants are declared in lifecycle order, so `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// Every event, in lifecycle order.
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Create,
        LifecycleEvent::Start,
        LifecycleEvent::Resume,
        LifecycleEvent::Pause,
        LifecycleEvent::Stop,
        LifecycleEvent::Destroy,
    ];

    /// Whether the view instance is gone after this event.
    pub fn is_terminal(self) -> bool {
        self == LifecycleEvent::Destroy
    }

    /// Whether `self` may directly follow `previous`.
    ///
    /// `None` means nothing has been reported yet. Views may cycle between
    /// resumed and paused, and between stopped and started, any number of
    /// times before they are destroyed.
    pub fn can_follow(self, previous: Option<LifecycleEvent>) -> bool {
        use LifecycleEvent::*;

        matches!(
            (previous, self),
            (None, Create)
                | (Some(Create), Start | Destroy)
                | (Some(Start), Resume | Stop)
                | (Some(Resume), Pause)
                | (Some(Pause), Resume | Stop)
                | (Some(Stop), Start | Destroy)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::Create => "create",
            LifecycleEvent::Start => "start",
            LifecycleEvent::Resume => "resume",
            LifecycleEvent::Pause => "pause",
            LifecycleEvent::Stop => "stop",
            LifecycleEvent::Destroy => "destroy",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient UI controller that a view model can be attached to.
pub trait View: Send + Sync + 'static {
    /// The view's lifecycle events, from the moment of subscription.
    fn lifecycle(&self) -> Observable<LifecycleEvent>;

    /// Whether a `Destroy` reported now means the view is permanently
    /// dismissed rather than about to be recreated.
    ///
    /// Views that cannot tell the difference keep the default.
    fn is_terminal_dismissal(&self) -> bool {
        true
    }
}

/// Whether `event` ends the life of `view` for binding purposes.
pub fn is_finished<V: View + ?Sized>(view: &V, event: LifecycleEvent) -> bool {
    event.is_terminal() && view.is_terminal_dismissal()
}

/// Publishes a view's lifecycle.
///
/// Views embed a relay and return [`LifecycleRelay::observe`] from
/// [`View::lifecycle`]. Events that break the lifecycle order are logged
/// and dropped; the stream completes after `Destroy`.
pub struct LifecycleRelay {
    events: Subject<LifecycleEvent>,
    last: Mutex<Option<LifecycleEvent>>,
}

impl LifecycleRelay {
    pub fn new() -> Self {
        Self {
            events: Subject::new(),
            last: Mutex::new(None),
        }
    }

    /// Report `event`. Returns whether it was published.
    pub fn emit(&self, event: LifecycleEvent) -> bool {
        {
            let mut last = self.last.lock();
            let previous = *last;
            if !event.can_follow(previous) {
                tracing::warn!(
                    relay = self.events.id(),
                    %event,
                    ?previous,
                    "dropping out-of-order lifecycle event"
                );
                return false;
            }
            *last = Some(event);
        }

        self.events.next(event);
        if event.is_terminal() {
            self.events.complete();
        }
        true
    }

    /// The most recently published event.
    pub fn last(&self) -> Option<LifecycleEvent> {
        *self.last.lock()
    }

    pub fn observe(&self) -> Observable<LifecycleEvent> {
        self.events.observe()
    }
}

impl Default for LifecycleRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleRelay")
            .field("id", &self.events.id())
            .field("last", &self.last())
            .finish()
    }
}
