//! View Models
//!
//! The long-lived side of the binding: a [`ViewModel`] owns the attachment
//! channel, the external signal channels and the subscription registry, and
//! exposes the host hooks that drive them.

mod channel;
mod environment;
mod model;
mod registry;
mod state;

pub use channel::SignalChannel;
pub use environment::{Analytics, Environment, NoopAnalytics};
pub use model::{SavedState, ViewModel};
pub use registry::{Disposable, FnDisposable, SubscriptionRegistry};
pub use state::{Hook, ViewModelState};
