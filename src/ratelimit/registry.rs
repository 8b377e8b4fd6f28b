//! Named limiters sharing one store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::limiter::RateLimiter;
use super::window::Verdict;
use crate::clock::TimeSource;
use crate::config::QuotaConfig;
use crate::error::{QuotaError, Result};
use crate::store::PersistenceStore;

/// A set of limiters built from one configuration.
///
/// All limiters write to the same store; their names keep the keys apart.
#[derive(Debug, Default)]
pub struct LimiterRegistry {
    limiters: HashMap<String, Arc<RateLimiter>>,
}

impl LimiterRegistry {
    /// Build one limiter per configured entry.
    pub fn from_config(
        config: &QuotaConfig,
        store: Arc<dyn PersistenceStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        config.validate()?;

        let mut limiters = HashMap::with_capacity(config.limiters.len());
        for limiter_config in &config.limiters {
            let limiter = RateLimiter::new(limiter_config.clone(), store.clone(), clock.clone())?;
            limiters.insert(limiter_config.name.clone(), Arc::new(limiter));
        }

        info!(count = limiters.len(), "Limiters initialized");
        Ok(Self { limiters })
    }

    /// Look up a limiter by name.
    pub fn get(&self, name: &str) -> Option<Arc<RateLimiter>> {
        self.limiters.get(name).cloned()
    }

    /// Run an admission check for `qualifier` against the limiter `name`.
    pub async fn check(&self, name: &str, qualifier: &str) -> Result<Verdict> {
        let limiter = self
            .limiters
            .get(name)
            .ok_or_else(|| QuotaError::UnknownLimiter(name.to_string()))?;
        limiter.check_and_record(qualifier).await
    }

    /// Names of the registered limiters, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.limiters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered limiters.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether no limiters are registered.
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}
