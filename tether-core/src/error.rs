//! Error types.

use thiserror::Error;

use crate::viewmodel::{Hook, ViewModelState};

/// A host called into a view model out of order.
///
/// These indicate an integration bug in the host, not a runtime condition
/// to recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("`{hook}` is not allowed while the view model is {state}")]
    ProtocolViolation {
        hook: Hook,
        state: ViewModelState,
    },
}

/// Releasing a registered resource failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisposeError {
    #[error("release failed: {0}")]
    Failed(String),

    #[error("release panicked: {0}")]
    Panicked(String),
}

/// A view model config could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid view model config: {0}")]
    Parse(#[from] serde_json::Error),
}
