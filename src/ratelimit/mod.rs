//! Sliding-window rate limiting.

mod key;
mod limiter;
mod record;
mod registry;
mod window;

pub use key::StorageKey;
pub use limiter::RateLimiter;
pub use record::CallRecord;
pub use registry::LimiterRegistry;
pub use window::{SlidingWindow, Verdict, WindowOutcome};
