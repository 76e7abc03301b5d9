//! Sliding-window request counter
//!
//! Counts operations per whole minute, one cache entry per minute bucket,
//! pruned on every increment. Reuses the `file-kv-cache` contract for
//! storage, so any `Cache` backend can hold the buckets.

pub mod error;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use tracker::RateTracker;
