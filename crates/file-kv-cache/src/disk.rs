//! Disk-backed cache with an in-memory index
//!
//! One file per key under `cache_dir`, each holding a JSON envelope of
//! `(written_at, value)`. The in-memory index is the read fast path; the
//! files are the restart-durable copy. Every mutation goes through a
//! single locked path so the index and the directory never diverge.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::contract::{validate_key, Cache};
use crate::entry::{CacheEntry, DiskCacheConfig, StoredEntry};
use crate::error::Result;

/// An indexed entry. `seq` breaks ordering ties between entries written
/// within the same timestamp tick.
#[derive(Debug, Clone)]
struct IndexEntry {
    entry: CacheEntry,
    seq: u64,
}

#[derive(Debug, Default)]
struct Index {
    map: HashMap<String, IndexEntry>,
    next_seq: u64,
}

/// File-per-key cache bounded by entry count, with lazy TTL expiry and
/// oldest-write eviction.
pub struct DiskCache {
    config: DiskCacheConfig,
    index: Mutex<Index>,
}

impl DiskCache {
    /// Create a cache over `config.cache_dir`. Call `init` before use.
    pub fn new(config: DiskCacheConfig) -> Self {
        Self {
            config,
            index: Mutex::new(Index::default()),
        }
    }

    /// Ensure the cache directory exists.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.config.cache_dir).await?;
        info!(cache_dir = ?self.config.cache_dir, "Cache initialized");
        Ok(())
    }

    pub fn config(&self) -> &DiskCacheConfig {
        &self.config
    }

    /// Adopt a key persisted by an earlier process into this instance's
    /// index. A fresh `DiskCache` starts with an empty index and does not
    /// scan `cache_dir`; this is the explicit per-key way to resurrect
    /// prior entries. Expired files are deleted instead of adopted.
    pub async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        validate_key(key)?;

        let path = self.entry_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let stored: StoredEntry = serde_json::from_slice(&bytes)?;
        let entry = stored.into_entry()?;

        if self.is_expired(&entry, Utc::now()) {
            debug!(key = %key, "Expired entry on disk, deleting");
            let mut index = self.index.lock().await;
            self.remove_locked(&mut index, key).await?;
            return Ok(None);
        }

        let mut index = self.index.lock().await;
        let seq = index.next_seq;
        index.next_seq += 1;
        index.map.insert(
            key.to_string(),
            IndexEntry {
                entry: entry.clone(),
                seq,
            },
        );
        self.evict_overflow(&mut index).await?;

        Ok(Some(entry))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.config.cache_dir.join(key)
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.age_secs(now) >= self.config.ttl_secs as i64
    }

    /// Write the envelope to a temp file, then rename into place. A crash
    /// mid-write leaves only a stray dot-file, never a truncated entry.
    /// Dot-prefixed names are rejected by `validate_key`, so the staging
    /// file can never collide with another key's entry file.
    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let path = self.entry_path(key);
        let tmp = self.config.cache_dir.join(format!(".{}.tmp", key));

        let bytes = serde_json::to_vec(&StoredEntry::from_entry(entry))?;
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// The single mutation path for deletions: drops the index entry and
    /// the backing file together. Missing files are not an error.
    async fn remove_locked(&self, index: &mut Index, key: &str) -> Result<()> {
        index.map.remove(key);

        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Evict oldest-written entries until the index fits the bound. A
    /// single `set` can only overshoot by one, so this removes at most one
    /// entry per call under single-writer use.
    async fn evict_overflow(&self, index: &mut Index) -> Result<()> {
        while index.map.len() > self.config.max_entries {
            let oldest = index
                .map
                .iter()
                .min_by_key(|(_, e)| (e.entry.written_at, e.seq))
                .map(|(k, _)| k.clone());

            match oldest {
                Some(key) => {
                    debug!(key = %key, "Evicting oldest cache entry");
                    self.remove_locked(index, &key).await?;
                }
                None => break,
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Cache for DiskCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        validate_key(key)?;

        let mut index = self.index.lock().await;
        let entry = match index.map.get(key) {
            Some(indexed) => indexed.entry.clone(),
            None => return Ok(None),
        };

        if self.is_expired(&entry, Utc::now()) {
            debug!(key = %key, ttl_secs = self.config.ttl_secs, "Cache entry expired");
            self.remove_locked(&mut index, key).await?;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;

        let entry = CacheEntry {
            value: value.to_vec(),
            written_at: Utc::now(),
        };

        // Lock spans disk write, index update, and eviction: the index and
        // the directory must agree after every mutation.
        let mut index = self.index.lock().await;
        self.persist(key, &entry).await?;

        let seq = index.next_seq;
        index.next_seq += 1;
        index.map.insert(key.to_string(), IndexEntry { entry, seq });

        self.evict_overflow(&mut index).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        let mut index = self.index.lock().await;
        self.remove_locked(&mut index, key).await
    }

    async fn entries(&self) -> Result<Vec<(String, CacheEntry)>> {
        let index = self.index.lock().await;
        let mut all: Vec<_> = index
            .map
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();
        all.sort_by_key(|(_, e)| (e.entry.written_at, e.seq));

        Ok(all.into_iter().map(|(k, e)| (k, e.entry)).collect())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries().await?.into_iter().map(|(k, _)| k).collect())
    }
}
