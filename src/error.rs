//! Error types for sliding-quota.

use thiserror::Error;

/// Main error type for rate limiter operations.
#[derive(Error, Debug)]
pub enum QuotaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence store failed; the verdict is unknown
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No limiter is registered under the requested name
    #[error("Unknown limiter: {0}")]
    UnknownLimiter(String),

    /// The store returned without running the transform for this key
    #[error("Store did not apply the transform for key {0}")]
    TransformNotApplied(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`PersistenceStore`](crate::store::PersistenceStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend rejected or failed the operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// Optimistic updates kept losing to concurrent writers
    #[error("Gave up on key {key} after {attempts} conflicting attempts")]
    Contention { key: String, attempts: u32 },

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for rate limiter operations.
pub type Result<T> = std::result::Result<T, QuotaError>;
