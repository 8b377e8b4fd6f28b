//! Persistence stores.
//!
//! The limiter only needs one primitive from its store: run a pure
//! transform over the record of a key with no other writer for that key
//! interleaved between the read and the write.

mod memory;
mod versioned;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use crate::ratelimit::{CallRecord, StorageKey};

pub use memory::MemoryStore;
pub use versioned::VersionedStore;

/// A transform from the current record (or its absence) to the next one.
///
/// Stores that implement atomicity optimistically may invoke it more than
/// once; only the output of the committed invocation is persisted.
pub type Transform<'a> = &'a (dyn Fn(Option<CallRecord>) -> CallRecord + Send + Sync);

/// Trait for keyed record stores offering atomic read-modify-write.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Apply `transform` to the record stored under `key`, commit its output
    /// and return the committed record.
    ///
    /// Concurrent calls for the same key behave as if run one after
    /// another. Calls for different keys are independent.
    async fn atomic_update(
        &self,
        key: &StorageKey,
        transform: Transform<'_>,
    ) -> Result<CallRecord, StoreError>;
}

/// Build the store selected by `config`.
pub fn build_store(config: &StoreConfig) -> Arc<dyn PersistenceStore> {
    info!(backend = ?config.backend, max_retries = config.max_retries, "Initializing store");
    match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Versioned => Arc::new(VersionedStore::with_max_retries(config.max_retries)),
    }
}
