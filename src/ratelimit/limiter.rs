//! Core rate limiter implementation.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::key::StorageKey;
use super::record::CallRecord;
use super::window::{SlidingWindow, Verdict, WindowOutcome};
use crate::clock::TimeSource;
use crate::config::LimiterConfig;
use crate::error::{QuotaError, Result};
use crate::store::PersistenceStore;

/// A named sliding-window limiter.
///
/// Every check is a single atomic update of the qualifier's record in the
/// injected store. The limiter holds no per-qualifier state of its own and
/// can be shared freely across tasks.
pub struct RateLimiter {
    config: LimiterConfig,
    window: SlidingWindow,
    store: Arc<dyn PersistenceStore>,
    clock: Arc<dyn TimeSource>,
}

impl RateLimiter {
    /// Create a new limiter, failing if the configuration is invalid.
    pub fn new(
        config: LimiterConfig,
        store: Arc<dyn PersistenceStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        config.validate()?;
        let window = SlidingWindow::new(config.period_seconds, config.max_calls);

        debug!(
            limiter = %config.name,
            period_seconds = config.period_seconds,
            max_calls = config.max_calls,
            "Creating rate limiter"
        );

        Ok(Self {
            config,
            window,
            store,
            clock,
        })
    }

    /// The limiter's name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The limiter's configuration.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// The key under which `qualifier`'s calls are stored.
    pub fn storage_key(&self, qualifier: &str) -> StorageKey {
        StorageKey::new(&self.config.name, qualifier)
    }

    /// Decide whether a call for `qualifier` is admitted and, if so, record
    /// it.
    ///
    /// Expired timestamps are pruned whatever the verdict. A store failure
    /// is returned as-is; no verdict is assumed.
    pub async fn check_and_record(&self, qualifier: &str) -> Result<Verdict> {
        let key = self.storage_key(qualifier);
        let now = self.clock.now_seconds();

        trace!(key = %key, now, "Checking rate limit");

        // Holds the outcome of the latest transform run, which is the one
        // the store commits.
        let slot: Mutex<Option<WindowOutcome>> = Mutex::new(None);
        let window = self.window;
        let transform = |previous: Option<CallRecord>| {
            let outcome = window.apply(previous, now);
            let record = outcome.record.clone();
            *slot.lock() = Some(outcome);
            record
        };

        let committed = match self.store.atomic_update(&key, &transform).await {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "Rate limit check failed");
                return Err(e.into());
            }
        };

        let outcome = slot
            .into_inner()
            .ok_or_else(|| QuotaError::TransformNotApplied(key.to_string()))?;

        if self.config.debug {
            debug!(
                limiter = %self.config.name,
                qualifier,
                now,
                kept = outcome.kept,
                expired = outcome.expired,
                stored = committed.len(),
                verdict = outcome.verdict.as_str(),
                "Rate limit decision"
            );
        }

        Ok(outcome.verdict)
    }

    /// Check a call for `qualifier`, returning `true` when the quota is
    /// exceeded (the call is rejected) and `false` when it was admitted.
    pub async fn is_quota_exceeded(&self, qualifier: &str) -> Result<bool> {
        Ok(self.check_and_record(qualifier).await?.is_exceeded())
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
