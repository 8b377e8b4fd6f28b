//! The persisted per-key record.

use serde::{Deserialize, Serialize};

/// Timestamps of the admitted calls that were still inside the window when
/// the record was last written.
///
/// Serialized as `{"u": [..]}`. An absent record and an empty one mean the
/// same thing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(rename = "u", default)]
    timestamps: Vec<f64>,
}

impl CallRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding the given timestamps.
    pub fn from_timestamps(timestamps: Vec<f64>) -> Self {
        Self { timestamps }
    }

    /// Recorded timestamps, in insertion order.
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Consume the record, returning its timestamps.
    pub fn into_timestamps(self) -> Vec<f64> {
        self.timestamps
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether no calls are recorded.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The most recent timestamp, if any.
    pub fn newest(&self) -> Option<f64> {
        self.timestamps.iter().copied().reduce(f64::max)
    }

    pub(crate) fn push(&mut self, timestamp: f64) {
        self.timestamps.push(timestamp);
    }
}
