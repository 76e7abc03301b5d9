//! The cache contract shared by all backends

use async_trait::async_trait;

use crate::entry::CacheEntry;
use crate::error::{CacheError, Result};

/// Keyed byte storage with write timestamps and TTL-aware reads.
///
/// Absent and expired keys are the `Ok(None)` result, never an error;
/// storage failures always propagate so the caller sees a desynchronized
/// backend instead of silently losing writes.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Return the live entry for `key`, or `None` if the key is absent or
    /// its TTL has elapsed. Expired entries are removed before returning.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Write `value` under `key` with the current timestamp, replacing any
    /// previous entry. May evict an older entry to stay within capacity.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete the entry for `key`. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Enumerate all indexed entries, oldest write first.
    async fn entries(&self) -> Result<Vec<(String, CacheEntry)>>;

    /// Enumerate all indexed keys, oldest write first.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Reject keys that are empty, begin with a dot, or could escape the
/// cache directory.
///
/// Callers are expected to pass pre-sanitized tokens; this is the backstop
/// that keeps a raw `../../etc/passwd` out of the filesystem layer.
/// Dot-prefixed names are reserved for a backend's own bookkeeping files
/// (`DiskCache` stages writes through them), so no valid key can collide
/// with one.
pub fn validate_key(key: &str) -> Result<()> {
    let escapes = key.is_empty()
        || key.starts_with('.')
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');

    if escapes {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_safe_tokens() {
        assert!(validate_key("abc123").is_ok());
        assert!(validate_key("www.example.com_page.html").is_ok());
        assert!(validate_key("29791265").is_ok());
        assert!(validate_key("a..b").is_ok());
        assert!(validate_key("a.tmp").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_escapes_and_reserved_names() {
        for key in ["", ".", "..", ".hidden", ".a.tmp", "a/b", "a\\b", "../up", "a\0b"] {
            let err = validate_key(key).unwrap_err();
            assert!(matches!(err, CacheError::InvalidKey(_)), "key: {:?}", key);
        }
    }
}
