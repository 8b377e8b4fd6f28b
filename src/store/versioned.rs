//! Optimistic document store.
//!
//! Records are kept as JSON documents tagged with a version, the way a
//! managed document database exposes them. Updates read a snapshot, run the
//! transform outside any lock and commit with a compare-and-swap on the
//! version, retrying when another writer got there first.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use super::{PersistenceStore, Transform};
use crate::error::StoreError;
use crate::ratelimit::{CallRecord, StorageKey};

/// Default number of attempts before giving up on a contended key.
const DEFAULT_MAX_RETRIES: u32 = 16;

#[derive(Debug, Clone)]
struct Document {
    version: u64,
    body: String,
}

/// A store of versioned JSON documents updated by compare-and-swap.
#[derive(Debug)]
pub struct VersionedStore {
    documents: RwLock<HashMap<String, Document>>,
    max_retries: u32,
}

impl VersionedStore {
    /// Create an empty store with the default retry budget.
    pub fn new() -> Self {
        Self::with_max_retries(DEFAULT_MAX_RETRIES)
    }

    /// Create an empty store that gives up after `max_retries` conflicting
    /// attempts on one update.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            max_retries: max_retries.max(1),
        }
    }

    /// Read and decode the record stored under `key`.
    pub fn get(&self, key: &StorageKey) -> Result<Option<CallRecord>, StoreError> {
        self.snapshot(key)
            .map(|doc| decode(&doc.body))
            .transpose()
    }

    /// The raw JSON document stored under `key`.
    pub fn raw_document(&self, key: &StorageKey) -> Option<String> {
        self.snapshot(key).map(|doc| doc.body)
    }

    /// Current version of the document under `key`; absent documents have
    /// no version.
    pub fn version(&self, key: &StorageKey) -> Option<u64> {
        self.snapshot(key).map(|doc| doc.version)
    }

    /// Unconditionally overwrite the record under `key`, bumping its version.
    pub fn insert(&self, key: &StorageKey, record: &CallRecord) -> Result<(), StoreError> {
        let body = serde_json::to_string(record)?;
        let mut documents = self.documents.write();
        let version = documents.get(key.as_str()).map_or(1, |doc| doc.version + 1);
        documents.insert(key.as_str().to_string(), Document { version, body });
        Ok(())
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn snapshot(&self, key: &StorageKey) -> Option<Document> {
        self.documents.read().get(key.as_str()).cloned()
    }

    /// Commit `body` if the document is still at `expected` (`None` = absent).
    fn compare_and_swap(&self, key: &StorageKey, expected: Option<u64>, body: String) -> bool {
        let mut documents = self.documents.write();
        let current = documents.get(key.as_str()).map(|doc| doc.version);
        if current != expected {
            return false;
        }

        let version = expected.map_or(1, |v| v + 1);
        documents.insert(key.as_str().to_string(), Document { version, body });
        true
    }
}

impl Default for VersionedStore {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(body: &str) -> Result<CallRecord, StoreError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl PersistenceStore for VersionedStore {
    async fn atomic_update(
        &self,
        key: &StorageKey,
        transform: Transform<'_>,
    ) -> Result<CallRecord, StoreError> {
        for attempt in 1..=self.max_retries {
            let snapshot = self.snapshot(key);
            let expected = snapshot.as_ref().map(|doc| doc.version);
            let previous = snapshot.map(|doc| decode(&doc.body)).transpose()?;

            let next = transform(previous);
            let body = serde_json::to_string(&next)?;

            if self.compare_and_swap(key, expected, body) {
                trace!(key = %key, attempt, version = ?expected, "Committed document");
                return Ok(next);
            }

            debug!(key = %key, attempt, "Version conflict, retrying");
            tokio::task::yield_now().await;
        }

        warn!(key = %key, attempts = self.max_retries, "Giving up on contended key");
        Err(StoreError::Contention {
            key: key.to_string(),
            attempts: self.max_retries,
        })
    }
}
