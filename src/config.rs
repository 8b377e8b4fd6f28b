//! Configuration management for sliding-quota.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{QuotaError, Result};

/// Configuration for a single named limiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Namespace for the storage keys of this limiter
    pub name: String,

    /// Length of the trailing window in seconds
    pub period_seconds: f64,

    /// Calls admitted per window
    pub max_calls: u32,

    /// Emit a diagnostic event for every decision
    #[serde(default)]
    pub debug: bool,
}

impl LimiterConfig {
    /// Create a new limiter configuration with debug logging disabled.
    pub fn new(name: impl Into<String>, period_seconds: f64, max_calls: u32) -> Self {
        Self {
            name: name.into(),
            period_seconds,
            max_calls,
            debug: false,
        }
    }

    /// Builder-style: set the window length
    pub fn period(mut self, period_seconds: f64) -> Self {
        self.period_seconds = period_seconds;
        self
    }

    /// Builder-style: set the admission threshold
    pub fn max_calls(mut self, max_calls: u32) -> Self {
        self.max_calls = max_calls;
        self
    }

    /// Builder-style: toggle diagnostic logging
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(QuotaError::Config("limiter name must not be empty".to_string()));
        }
        if !self.period_seconds.is_finite() || self.period_seconds <= 0.0 {
            return Err(QuotaError::Config(format!(
                "limiter {}: period_seconds must be a positive number, got {}",
                self.name, self.period_seconds
            )));
        }
        if self.max_calls == 0 {
            return Err(QuotaError::Config(format!(
                "limiter {}: max_calls must be at least 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// Which store implementation backs the limiters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Sharded in-process map, locked per entry
    #[default]
    Memory,
    /// Versioned JSON documents updated by compare-and-swap
    Versioned,
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: StoreBackend,

    /// Attempts before an optimistic update gives up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_max_retries() -> u32 {
    16
}

/// Top-level configuration: one store shared by any number of limiters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Limiters sharing the store
    #[serde(default)]
    pub limiters: Vec<LimiterConfig>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            limiters: vec![LimiterConfig::new("default", 60.0, 10)],
        }
    }
}

impl QuotaConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading quota configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: QuotaConfig = serde_yaml::from_str(yaml)
            .map_err(|e| QuotaError::Config(format!("Failed to parse quota config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the store settings and every limiter.
    pub fn validate(&self) -> Result<()> {
        if self.store.max_retries == 0 {
            return Err(QuotaError::Config("store.max_retries must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for limiter in &self.limiters {
            limiter.validate()?;
            if !seen.insert(limiter.name.as_str()) {
                return Err(QuotaError::Config(format!(
                    "duplicate limiter name: {}",
                    limiter.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_config_accepts_valid_parameters() {
        let config = LimiterConfig::new("login", 300.0, 1);
        assert!(config.validate().is_ok());
        assert!(!config.debug);
    }

    #[test]
    fn test_limiter_config_rejects_non_positive_period() {
        for period in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = LimiterConfig::new("login", period, 1);
            assert!(
                matches!(config.validate(), Err(QuotaError::Config(_))),
                "period {} should be rejected",
                period
            );
        }
    }

    #[test]
    fn test_limiter_config_rejects_zero_max_calls() {
        let config = LimiterConfig::new("login", 10.0, 0);
        assert!(matches!(config.validate(), Err(QuotaError::Config(_))));
    }

    #[test]
    fn test_limiter_config_rejects_empty_name() {
        let config = LimiterConfig::new("", 10.0, 1);
        assert!(matches!(config.validate(), Err(QuotaError::Config(_))));
    }

    #[test]
    fn test_limiter_config_builder() {
        let config = LimiterConfig::new("api", 1.0, 1)
            .period(20.0)
            .max_calls(3)
            .debug(true);
        assert_eq!(config.period_seconds, 20.0);
        assert_eq!(config.max_calls, 3);
        assert!(config.debug);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
store:
  backend: versioned
  max_retries: 4
limiters:
  - name: login
    period_seconds: 300
    max_calls: 1
  - name: api
    period_seconds: 20.5
    max_calls: 3
    debug: true
"#;
        let config = QuotaConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Versioned);
        assert_eq!(config.store.max_retries, 4);
        assert_eq!(config.limiters.len(), 2);
        assert_eq!(config.limiters[0], LimiterConfig::new("login", 300.0, 1));
        assert!(config.limiters[1].debug);
        assert_eq!(config.limiters[1].period_seconds, 20.5);
    }

    #[test]
    fn test_parse_config_defaults() {
        let yaml = r#"
limiters:
  - name: login
    period_seconds: 60
    max_calls: 5
"#;
        let config = QuotaConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.max_retries, 16);
    }

    #[test]
    fn test_parse_config_rejects_duplicate_names() {
        let yaml = r#"
limiters:
  - name: login
    period_seconds: 60
    max_calls: 5
  - name: login
    period_seconds: 10
    max_calls: 1
"#;
        let result = QuotaConfig::from_yaml(yaml);
        assert!(matches!(result, Err(QuotaError::Config(_))));
    }

    #[test]
    fn test_parse_config_rejects_invalid_limiter() {
        let yaml = r#"
limiters:
  - name: login
    period_seconds: 0
    max_calls: 5
"#;
        assert!(matches!(QuotaConfig::from_yaml(yaml), Err(QuotaError::Config(_))));
    }

    #[test]
    fn test_parse_config_rejects_zero_retries() {
        let yaml = r#"
store:
  max_retries: 0
"#;
        assert!(matches!(QuotaConfig::from_yaml(yaml), Err(QuotaError::Config(_))));
    }

    #[test]
    fn test_parse_config_rejects_garbage() {
        assert!(matches!(
            QuotaConfig::from_yaml("limiters: 12"),
            Err(QuotaError::Config(_))
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = QuotaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limiters[0].name, "default");
    }
}
