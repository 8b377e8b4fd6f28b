//! Time sources for window arithmetic.
//!
//! The limiter never reads the system clock directly; it asks an injected
//! [`TimeSource`] once per decision. [`SystemTimeSource`] is the production
//! implementation and [`ManualTimeSource`] is a settable clock for tests.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

/// Supplies the current time in seconds.
///
/// Values only need to be consistent with each other (for example seconds
/// since the Unix epoch); strict monotonicity is not required.
pub trait TimeSource: Send + Sync + Debug {
    /// Current time in seconds.
    fn now_seconds(&self) -> f64;
}

/// Wall-clock time in seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a new system time source.
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now_seconds(&self) -> f64 {
        let now = Utc::now();
        now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1_000_000_000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying value, so a test can hand one clone to a
/// limiter and keep another to drive time.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    seconds: Arc<Mutex<f64>>,
}

impl ManualTimeSource {
    /// Create a clock reading `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            seconds: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, seconds: f64) {
        *self.seconds.lock() = seconds;
    }

    /// Move forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        *self.seconds.lock() += seconds;
    }
}

impl TimeSource for ManualTimeSource {
    fn now_seconds(&self) -> f64 {
        *self.seconds.lock()
    }
}
