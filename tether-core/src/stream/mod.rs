//! Push Streams
//!
//! This module implements the small push-stream vocabulary the lifecycle
//! binding is built from.
//!
//! # Concepts
//!
//! ## Observables
//!
//! An [`Observable`] is a lazy stream description. Subscribing runs it and
//! returns a [`Subscription`]; elements are pushed into an [`Observer`] as
//! [`Event`]s.
//!
//! ## Subjects
//!
//! A [`Subject`] is a broadcast point without replay. View attachment and the
//! external signal channels are all subjects underneath.
//!
//! ## Subscriptions
//!
//! Cancelling a subscription is synchronous and idempotent. Operators chain
//! their upstream subscriptions into the one they return, so cancelling the
//! outermost handle releases the whole chain.

mod observable;
mod observer;
mod subject;
mod subscription;

pub use observable::{Observable, Transformer};
pub use observer::{Event, Observer};
pub use subject::Subject;
pub use subscription::{Subscription, SubscriptionId};
