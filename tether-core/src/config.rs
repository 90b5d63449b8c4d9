//! View model configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a view model does when a host calls it out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationPolicy {
    /// Return [`LifecycleError::ProtocolViolation`](crate::LifecycleError).
    Strict,
    /// Log a warning and ignore the call.
    Lenient,
}

impl Default for ViolationPolicy {
    /// Strict in debug builds, lenient in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ViolationPolicy::Strict
        } else {
            ViolationPolicy::Lenient
        }
    }
}

fn default_label() -> String {
    "view-model".to_string()
}

/// Per-instance settings, usually shared through an
/// [`Environment`](crate::Environment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModelConfig {
    /// Name used in log output.
    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default)]
    pub violation_policy: ViolationPolicy,
}

impl ViewModelConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_policy(mut self, policy: ViolationPolicy) -> Self {
        self.violation_policy = policy;
        self
    }
}

impl Default for ViewModelConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            violation_policy: ViolationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config =
            ViewModelConfig::from_json(r#"{"label": "discovery", "violation_policy": "lenient"}"#)
                .unwrap();

        assert_eq!(config.label, "discovery");
        assert_eq!(config.violation_policy, ViolationPolicy::Lenient);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = ViewModelConfig::from_json("{}").unwrap();
        assert_eq!(config, ViewModelConfig::default());
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ViewModelConfig::from_json(r#"{"violation_policy": "loud"}"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid view model config"));
    }

    #[test]
    fn builders_override_fields() {
        let config = ViewModelConfig::default()
            .with_label("settings")
            .with_policy(ViolationPolicy::Strict);

        assert_eq!(config.label, "settings");
        assert_eq!(config.violation_policy, ViolationPolicy::Strict);
    }
}
