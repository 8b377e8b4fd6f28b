//! Sliding Quota - per-key sliding-window call-rate limiting
//!
//! This crate decides whether a call made on behalf of a qualifier (a user
//! id, an IP address, ...) is admitted, based on how many calls that
//! qualifier made within a trailing period. Each decision is one atomic
//! update of the qualifier's record in an injected store, so any number of
//! processes sharing a store agree on the quota.

pub mod clock;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod store;
