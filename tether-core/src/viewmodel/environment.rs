//! Collaborators a view model receives at construction.

use std::fmt;
use std::sync::Arc;

use crate::config::ViewModelConfig;

/// Analytics sink handed to view models.
///
/// The core never calls it; concrete view models report through it.
pub trait Analytics: Send + Sync {
    fn track(&self, event: &str, properties: serde_json::Value);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn track(&self, _event: &str, _properties: serde_json::Value) {}
}

/// Shared dependencies for view models.
#[derive(Clone)]
pub struct Environment {
    analytics: Arc<dyn Analytics>,
    config: ViewModelConfig,
}

impl Environment {
    pub fn new(analytics: Arc<dyn Analytics>) -> Self {
        Self {
            analytics,
            config: ViewModelConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ViewModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn analytics(&self) -> &Arc<dyn Analytics> {
        &self.analytics
    }

    pub fn config(&self) -> &ViewModelConfig {
        &self.config
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Arc::new(NoopAnalytics))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
