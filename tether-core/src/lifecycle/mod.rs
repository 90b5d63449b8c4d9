//! View Lifecycle
//!
//! This module connects transient views to the streams of a long-lived
//! view model:
//!
//! - lifecycle events and the [`View`] capability
//! - [`ViewAttachment`], which view is attached right now
//! - [`bind_to_lifecycle`], the operator that ends streams when that view
//!   finishes

mod attachment;
mod binding;
mod event;

pub use attachment::ViewAttachment;
pub use binding::{bind_to_lifecycle, finish_signal};
pub use event::{is_finished, LifecycleEvent, LifecycleRelay, View};
