//! Subscription Registry
//!
//! A manual escape hatch next to the binding operator: resources a view
//! model holds that cannot be expressed as a bound stream (a handle to an
//! external service, a subscription made outside any view model stream) are
//! registered here and released when the view model is destroyed.
//!
//! # Release Guarantees
//!
//! - Every registered entry is released exactly once.
//! - Entries are released independently. A release that returns an error
//!   or panics is logged and collected; the remaining entries still run.
//! - An entry registered after the registry was released is released
//!   immediately.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::DisposeError;
use crate::stream::Subscription;

/// A resource that can be released.
pub trait Disposable: Send {
    /// Release the resource. Calling this again must be harmless.
    fn dispose(&self) -> Result<(), DisposeError>;
}

impl Disposable for Subscription {
    fn dispose(&self) -> Result<(), DisposeError> {
        self.cancel();
        Ok(())
    }
}

/// Adapts a release closure into a [`Disposable`] that runs at most once.
pub struct FnDisposable<F> {
    release: Mutex<Option<F>>,
}

impl<F> FnDisposable<F>
where
    F: FnOnce() -> Result<(), DisposeError> + Send,
{
    pub fn new(release: F) -> Self {
        Self {
            release: Mutex::new(Some(release)),
        }
    }
}

impl<F> Disposable for FnDisposable<F>
where
    F: FnOnce() -> Result<(), DisposeError> + Send,
{
    fn dispose(&self) -> Result<(), DisposeError> {
        let release = self.release.lock().take();
        match release {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

/// Owns the resources registered on a view model.
pub struct SubscriptionRegistry {
    entries: Mutex<Vec<Box<dyn Disposable>>>,
    released: AtomicBool,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        }
    }

    /// Register `entry` for release on [`dispose_all`](Self::dispose_all).
    ///
    /// Returns `false` if the registry was already released, in which case
    /// `entry` has been released on the spot.
    pub fn add<D: Disposable + 'static>(&self, entry: D) -> bool {
        {
            let mut entries = self.entries.lock();
            if !self.released.load(Ordering::SeqCst) {
                entries.push(Box::new(entry));
                return true;
            }
        }

        tracing::debug!("registry already released, releasing new entry immediately");
        if let Err(err) = release(&entry) {
            tracing::error!(error = %err, "releasing late registry entry failed");
        }
        false
    }

    /// Release every entry. Later calls find nothing left to release.
    ///
    /// Returns the failures, which have already been logged.
    pub fn dispose_all(&self) -> Vec<DisposeError> {
        let entries = {
            let mut entries = self.entries.lock();
            self.released.store(true, Ordering::SeqCst);
            std::mem::take(&mut *entries)
        };

        let total = entries.len();
        let mut failures = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            if let Err(err) = release(entry.as_ref()) {
                tracing::error!(index, total, error = %err, "releasing registry entry failed");
                failures.push(err);
            }
        }

        tracing::debug!(total, failed = failures.len(), "registry released");
        failures
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("len", &self.len())
            .field("released", &self.is_released())
            .finish()
    }
}

fn release(entry: &dyn Disposable) -> Result<(), DisposeError> {
    match panic::catch_unwind(AssertUnwindSafe(|| entry.dispose())) {
        Ok(result) => result,
        Err(payload) => Err(DisposeError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
