//! Lifecycle Binding
//!
//! The binding operator ties a stream's lifetime to the view a view model is
//! attached to. Every stream a view model exposes is expected to pass
//! through it, so no concrete view model tracks attachment by hand.
//!
//! # How It Works
//!
//! 1. The finish signal subscribes to the attachment channel, starting from
//!    the view attached at subscription time.
//!
//! 2. Each time a view is attached, the signal drops its subscription to the
//!    previous view's lifecycle and subscribes to the new view's lifecycle.
//!    A detach (`None`) leaves the last view's lifecycle subscription in
//!    place, so a `Destroy` reported after `pause` is still seen.
//!
//! 3. When the tracked view reports an event for which [`is_finished`]
//!    holds, the signal fires. When the attachment channel completes, the
//!    signal completes.
//!
//! 4. The bound stream is `source.take_until(finish_signal)`: either outcome
//!    completes it and releases the source.

use std::sync::Arc;

use parking_lot::Mutex;

use super::attachment::ViewAttachment;
use super::event::{is_finished, View};
use crate::stream::{Event, Observable, Observer, Subscription, Transformer};

/// Fires once the most recently attached view finishes.
///
/// Completes when `views` completes.
pub fn finish_signal<V: View>(views: Observable<Option<Arc<V>>>) -> Observable<()> {
    Observable::new(move |observer: Observer<()>| {
        let subscription = Subscription::new();
        let tracked: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        {
            let tracked = Arc::clone(&tracked);
            subscription.add_teardown(move || {
                let previous = tracked.lock().take();
                if let Some(previous) = previous {
                    previous.cancel();
                }
            });
        }

        let views_subscription = {
            let subscription = subscription.clone();
            views.subscribe_events(move |event| match event {
                Event::Next(Some(view)) => {
                    let previous = tracked.lock().take();
                    if let Some(previous) = previous {
                        previous.cancel();
                    }

                    let lifecycle = track_view(&view, observer.clone());
                    if subscription.is_cancelled() {
                        lifecycle.cancel();
                    } else {
                        *tracked.lock() = Some(lifecycle);
                    }
                }
                Event::Next(None) => {}
                Event::Completed => {
                    observer.complete();
                    subscription.cancel();
                }
            })
        };
        subscription.add(views_subscription);

        subscription
    })
}

fn track_view<V: View>(view: &Arc<V>, observer: Observer<()>) -> Subscription {
    let weak = Arc::downgrade(view);

    view.lifecycle().subscribe(move |event| {
        // A view the host already dropped cannot come back.
        let finished = match weak.upgrade() {
            Some(view) => is_finished(view.as_ref(), event),
            None => true,
        };

        if finished {
            tracing::debug!(%event, "bound view finished");
            observer.next(());
        }
    })
}

/// Build the binding operator for `attachment`.
///
/// Streams composed with the returned transformer forward their elements
/// until the attached view finishes or the attachment channel completes.
pub fn bind_to_lifecycle<V, T>(attachment: &ViewAttachment<V>) -> Transformer<T, T>
where
    V: View,
    T: Send + 'static,
{
    let finished = finish_signal(attachment.attached_views());
    Transformer::new(move |source: Observable<T>| source.take_until(finished.clone()))
}
