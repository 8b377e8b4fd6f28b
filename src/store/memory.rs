//! In-process store backed by a sharded map.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace};

use super::{PersistenceStore, Transform};
use crate::error::StoreError;
use crate::ratelimit::{CallRecord, StorageKey};

/// Thread-safe record store backed by DashMap.
///
/// The transform runs while the entry's shard is write-locked, which
/// serializes updates of the same key. Keys living on other shards are
/// updated in parallel.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, CallRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Read the record stored under `key`.
    pub fn get(&self, key: &StorageKey) -> Option<CallRecord> {
        self.records.get(key.as_str()).map(|r| r.value().clone())
    }

    /// Overwrite the record stored under `key`.
    pub fn insert(&self, key: &StorageKey, record: CallRecord) {
        self.records.insert(key.as_str().to_string(), record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Delete records whose newest timestamp is at or before `cutoff`.
    ///
    /// Returns the number of records removed. Pass `now - longest period` to
    /// drop only records no limiter can still count.
    pub fn compact(&self, cutoff: f64) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| record.newest().is_some_and(|newest| newest > cutoff));
        let removed = before.saturating_sub(self.records.len());

        debug!(cutoff, removed, remaining = self.records.len(), "Compacted memory store");
        removed
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn atomic_update(
        &self,
        key: &StorageKey,
        transform: Transform<'_>,
    ) -> Result<CallRecord, StoreError> {
        trace!(key = %key, "Updating record");

        let next = match self.records.entry(key.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let next = transform(Some(entry.get().clone()));
                entry.insert(next.clone());
                next
            }
            Entry::Vacant(entry) => {
                let next = transform(None);
                entry.insert(next.clone());
                next
            }
        };

        Ok(next)
    }
}
