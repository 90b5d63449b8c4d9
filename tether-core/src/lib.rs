//! Tether Core
//!
//! This crate lets a long-lived view model survive across many short-lived
//! views. Views are destroyed and recreated (on rotation, for instance);
//! the view model keeps its streams, pending results and accumulated state,
//! and ends each stream exactly once, when the view it is bound to is gone
//! for good or when the view model itself is destroyed.
//!
//! It implements:
//!
//! - Push streams with synchronous, idempotent cancellation
//! - The view attachment channel and the lifecycle binding operator
//! - External signal channels for results and navigation intents
//! - A registry for resources released on destroy
//! - The host-driven view model state machine
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `stream`: observables, observers, subjects, subscriptions
//! - `lifecycle`: lifecycle events, view attachment, the binding operator
//! - `viewmodel`: the view model, its channels, registry and environment
//! - `config`: per-instance configuration
//! - `error`: error types
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::{Environment, ViewModel};
//!
//! let vm: ViewModel<MyView, ActivityResult, Intent> = ViewModel::new(Environment::default());
//!
//! // Every exposed stream goes through the binding operator.
//! let titles = vm.intents().map(|intent| intent.title).compose(&vm.bind_to_lifecycle());
//!
//! vm.create(&context, None)?;
//! vm.resume(view)?;
//! vm.push_intent(intent)?;   // delivered to `titles` subscribers
//! vm.pause()?;
//! vm.destroy()?;             // completes `titles`
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod stream;
pub mod viewmodel;

pub use config::{ViewModelConfig, ViolationPolicy};
pub use error::{ConfigError, DisposeError, LifecycleError};
pub use lifecycle::{LifecycleEvent, LifecycleRelay, View};
pub use stream::{Event, Observable, Subscription, Transformer};
pub use viewmodel::{Environment, ViewModel, ViewModelState};
