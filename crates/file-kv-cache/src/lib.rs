//! File-backed key/value cache with TTL expiry and size-bounded eviction
//!
//! Provides the `Cache` contract for keyed byte storage with write
//! timestamps, and `DiskCache`, a file-per-key implementation with an
//! in-memory index, lazy TTL expiry, and oldest-write eviction.

pub mod contract;
pub mod disk;
pub mod entry;
pub mod error;

pub use contract::{validate_key, Cache};
pub use disk::DiskCache;
pub use entry::{CacheEntry, DiskCacheConfig};
pub use error::{CacheError, Result};
