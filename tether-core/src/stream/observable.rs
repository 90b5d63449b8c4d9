//! Observable Implementation
//!
//! An Observable is a lazy description of a push stream. Nothing happens
//! until a consumer subscribes; each subscription runs the stream's subscribe
//! function again, so every subscriber gets its own independent run.
//!
//! # Delivery
//!
//! Delivery is synchronous: a producer calling `next` runs the whole
//! downstream operator chain on its own thread before `next` returns. This
//! keeps ordering exact within one stream and makes cancellation take effect
//! immediately.
//!
//! # Operators
//!
//! Only the operators the lifecycle binding needs are provided:
//!
//! - `map` and `filter` for shaping element streams
//! - `take_until` for ending a stream when another one fires
//! - `compose` for applying a reusable [`Transformer`]

use std::fmt;
use std::sync::Arc;

use super::observer::{Event, Observer};
use super::subscription::Subscription;

type OnSubscribe<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync;

/// A lazy push stream of `T`.
///
/// # Example
///
/// ```rust,ignore
/// let subject = Subject::new();
/// let doubled = subject.observe().map(|v: i32| v * 2);
///
/// let subscription = doubled.subscribe(|v| println!("got {v}"));
/// subject.next(21); // prints "got 42"
/// subscription.cancel();
/// ```
pub struct Observable<T> {
    on_subscribe: Arc<OnSubscribe<T>>,
}

impl<T: Send + 'static> Observable<T> {
    /// Create an observable from its subscribe function.
    ///
    /// The function receives the downstream observer and returns the
    /// subscription that releases whatever it set up.
    pub fn new<F>(on_subscribe: F) -> Self
    where
        F: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            on_subscribe: Arc::new(on_subscribe),
        }
    }

    /// A stream that completes immediately.
    pub fn empty() -> Self {
        Self::new(|observer| {
            observer.complete();
            Subscription::cancelled()
        })
    }

    /// A stream that emits `items` in order, then completes.
    pub fn of(items: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move |observer| {
            for item in items.iter().cloned() {
                if observer.is_closed() {
                    break;
                }
                observer.next(item);
            }
            observer.complete();
            Subscription::cancelled()
        })
    }

    /// Subscribe with a full observer.
    pub fn subscribe_with(&self, observer: Observer<T>) -> Subscription {
        (self.on_subscribe)(observer)
    }

    /// Subscribe to elements only, ignoring completion.
    pub fn subscribe<F>(&self, on_next: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe_with(Observer::new(move |event| {
            if let Event::Next(value) = event {
                on_next(value);
            }
        }))
    }

    /// Subscribe to every event, completion included.
    pub fn subscribe_events<F>(&self, on_event: F) -> Subscription
    where
        F: Fn(Event<T>) + Send + Sync + 'static,
    {
        self.subscribe_with(Observer::new(on_event))
    }

    /// Transform each element.
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);

        Observable::new(move |observer: Observer<U>| {
            let f = Arc::clone(&f);
            source.subscribe_with(Observer::new(move |event| match event {
                Event::Next(value) => observer.next(f(value)),
                Event::Completed => observer.complete(),
            }))
        })
    }

    /// Keep only the elements matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Observable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        let predicate = Arc::new(predicate);

        Observable::new(move |observer: Observer<T>| {
            let predicate = Arc::clone(&predicate);
            source.subscribe_with(Observer::new(move |event| match event {
                Event::Next(value) => {
                    if predicate(&value) {
                        observer.next(value);
                    }
                }
                Event::Completed => observer.complete(),
            }))
        })
    }

    /// Mirror this stream until `notifier` emits or completes.
    ///
    /// When the notifier fires, the derived stream completes and both
    /// upstream subscriptions are released. Elements emitted by the source
    /// after that point are never delivered.
    pub fn take_until<U: Send + 'static>(&self, notifier: Observable<U>) -> Observable<T> {
        let source = self.clone();

        Observable::new(move |observer: Observer<T>| {
            let subscription = Subscription::new();

            let notifier_subscription = {
                let observer = observer.clone();
                let subscription = subscription.clone();
                notifier.subscribe_events(move |_| {
                    observer.complete();
                    subscription.cancel();
                })
            };
            subscription.add(notifier_subscription);

            // The notifier may have fired while subscribing.
            if subscription.is_cancelled() {
                return subscription;
            }

            let source_subscription = {
                let subscription = subscription.clone();
                source.subscribe_events(move |event| match event {
                    Event::Next(value) => observer.next(value),
                    Event::Completed => {
                        observer.complete();
                        subscription.cancel();
                    }
                })
            };
            subscription.add(source_subscription);

            subscription
        })
    }

    /// Apply a reusable transformer to this stream.
    pub fn compose<U: Send + 'static>(&self, transformer: &Transformer<T, U>) -> Observable<U> {
        transformer.apply(self.clone())
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: Arc::clone(&self.on_subscribe),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

/// A reusable stream-to-stream function, applied with [`Observable::compose`].
pub struct Transformer<T, U> {
    apply: Arc<dyn Fn(Observable<T>) -> Observable<U> + Send + Sync>,
}

impl<T, U> Transformer<T, U> {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(Observable<T>) -> Observable<U> + Send + Sync + 'static,
    {
        Self {
            apply: Arc::new(apply),
        }
    }

    pub fn apply(&self, source: Observable<T>) -> Observable<U> {
        (self.apply)(source)
    }
}

impl<T, U> Clone for Transformer<T, U> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<T, U> fmt::Debug for Transformer<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer").finish_non_exhaustive()
    }
}
