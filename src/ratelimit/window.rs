//! Sliding-window admission.

use super::record::CallRecord;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The call was admitted and recorded
    Admitted,
    /// The quota was already used up; nothing was recorded
    Rejected,
}

impl Verdict {
    /// Whether the call was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Verdict::Admitted)
    }

    /// Whether the quota was exceeded.
    pub fn is_exceeded(&self) -> bool {
        matches!(self, Verdict::Rejected)
    }

    /// Lowercase label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Admitted => "admitted",
            Verdict::Rejected => "rejected",
        }
    }
}

/// Result of applying the window to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOutcome {
    /// The record to persist
    pub record: CallRecord,
    /// The admission decision
    pub verdict: Verdict,
    /// Calls still inside the window before this one
    pub kept: usize,
    /// Timestamps dropped because they fell out of the window
    pub expired: usize,
}

/// The pure part of the limiter: a trailing window of `period_seconds`
/// admitting at most `max_calls` calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidingWindow {
    period_seconds: f64,
    max_calls: u32,
}

impl SlidingWindow {
    /// Create a new window. Parameters are validated by
    /// [`LimiterConfig::validate`](crate::config::LimiterConfig::validate).
    pub fn new(period_seconds: f64, max_calls: u32) -> Self {
        Self {
            period_seconds,
            max_calls,
        }
    }

    /// Window length in seconds.
    pub fn period_seconds(&self) -> f64 {
        self.period_seconds
    }

    /// Admission threshold.
    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    /// Prune `previous` relative to `now` and decide whether a call at `now`
    /// is admitted.
    ///
    /// A timestamp survives only if it is strictly newer than
    /// `now - period_seconds`. The call is admitted when fewer than
    /// `max_calls` timestamps survive, and only then is `now` appended.
    /// Pruning happens whatever the verdict.
    pub fn apply(&self, previous: Option<CallRecord>, now: f64) -> WindowOutcome {
        let floor = now - self.period_seconds;
        let timestamps = previous.map(CallRecord::into_timestamps).unwrap_or_default();
        let total = timestamps.len();

        let mut record = CallRecord::from_timestamps(
            timestamps.into_iter().filter(|&t| t > floor).collect(),
        );
        let kept = record.len();

        let verdict = if kept < self.max_calls as usize {
            record.push(now);
            Verdict::Admitted
        } else {
            Verdict::Rejected
        };

        WindowOutcome {
            record,
            verdict,
            kept,
            expired: total - kept,
        }
    }
}
