//! Entry and configuration types

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// A live cache entry: stored bytes plus the time of the last write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: Vec<u8>,
    pub written_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Seconds elapsed since the entry was written, clamped to zero.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.written_at).num_seconds().max(0)
    }
}

/// On-disk JSON envelope for a single entry. The value travels as base64
/// so arbitrary bytes survive the JSON encoding.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub written_at: DateTime<Utc>,
    pub value: String,
}

impl StoredEntry {
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            written_at: entry.written_at,
            value: BASE64.encode(&entry.value),
        }
    }

    pub fn into_entry(self) -> Result<CacheEntry> {
        Ok(CacheEntry {
            value: BASE64.decode(self.value.as_bytes())?,
            written_at: self.written_at,
        })
    }
}

/// Configuration for a `DiskCache`.
#[derive(Debug, Clone)]
pub struct DiskCacheConfig {
    /// Directory holding one file per cached key, created by `init`.
    pub cache_dir: PathBuf,
    /// Entry-count bound; exceeding it evicts the oldest-written entry.
    pub max_entries: usize,
    /// Entries older than this are expired on read. Zero expires everything.
    pub ttl_secs: u64,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache"),
            max_entries: 100,
            ttl_secs: 3600, // 1 hour
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiskCacheConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.ttl_secs, 3600);
    }

    #[test]
    fn test_stored_entry_round_trip() {
        let entry = CacheEntry {
            value: vec![0, 159, 146, 150, 255],
            written_at: Utc::now(),
        };

        let json = serde_json::to_string(&StoredEntry::from_entry(&entry)).unwrap();
        let stored: StoredEntry = serde_json::from_str(&json).unwrap();
        let restored = stored.into_entry().unwrap();

        assert_eq!(restored.value, entry.value);
        assert_eq!(restored.written_at, entry.written_at);
    }

    #[test]
    fn test_stored_entry_bad_base64() {
        let stored = StoredEntry {
            written_at: Utc::now(),
            value: "not-base64!!!".to_string(),
        };
        assert!(stored.into_entry().is_err());
    }

    #[test]
    fn test_age_secs_clamps_future_writes() {
        let entry = CacheEntry {
            value: Vec::new(),
            written_at: Utc::now() + chrono::Duration::seconds(30),
        };
        assert_eq!(entry.age_secs(Utc::now()), 0);
    }
}
