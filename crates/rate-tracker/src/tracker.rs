//! Minute-bucket counting over a cache backend

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, TrackerError};
use file_kv_cache::{Cache, CacheEntry};

/// Default retention window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

/// Counts tracked operations over the trailing window.
///
/// Each whole minute gets one bucket entry in the backing cache, keyed by
/// its epoch-minute number with the count as a decimal string. Buckets
/// older than the window are pruned on every `increment`; there is no
/// background sweep.
pub struct RateTracker {
    buckets: Arc<dyn Cache>,
    window_minutes: u32,
}

impl RateTracker {
    /// Track with the default 60-minute retention window.
    pub fn new(buckets: Arc<dyn Cache>) -> Self {
        Self::with_window(buckets, DEFAULT_WINDOW_MINUTES)
    }

    /// Track with a custom retention window. The window bounds the largest
    /// period `count` will accept, so size it to the longest query any
    /// caller makes. A zero window is clamped to one minute so every
    /// tracker can answer at least `count(60)`.
    pub fn with_window(buckets: Arc<dyn Cache>, window_minutes: u32) -> Self {
        Self {
            buckets,
            window_minutes: window_minutes.max(1),
        }
    }

    pub fn window_minutes(&self) -> u32 {
        self.window_minutes
    }

    /// Record one operation against the current minute, then prune buckets
    /// that have aged out of the window.
    pub async fn increment(&self) -> Result<()> {
        let current_minute = Self::current_minute();
        let key = current_minute.to_string();

        let count = match self.buckets.get(&key).await? {
            Some(entry) => parse_count(&entry).unwrap_or(0),
            None => 0,
        };
        self.buckets
            .set(&key, (count + 1).to_string().as_bytes())
            .await?;

        self.prune(current_minute).await
    }

    /// Sum the counts of all buckets inside the trailing `period_secs`,
    /// evaluated against the wall-clock minute at call time.
    ///
    /// `period_secs` must be a positive multiple of 60 and no longer than
    /// the retention window; anything else is rejected before any I/O.
    pub async fn count(&self, period_secs: u64) -> Result<u64> {
        if period_secs == 0 || period_secs % 60 != 0 {
            return Err(TrackerError::InvalidPeriod(format!(
                "{} is not a positive multiple of 60",
                period_secs
            )));
        }
        let period_minutes = (period_secs / 60) as i64;
        if period_minutes > i64::from(self.window_minutes) {
            return Err(TrackerError::InvalidPeriod(format!(
                "{}s exceeds the {}-minute retention window",
                period_secs, self.window_minutes
            )));
        }

        let current_minute = Self::current_minute();
        let mut total = 0u64;
        for (key, entry) in self.buckets.entries().await? {
            let Some(minute) = parse_minute(&key) else {
                continue;
            };
            if current_minute - minute < period_minutes {
                total += parse_count(&entry).unwrap_or(0);
            }
        }

        Ok(total)
    }

    /// Drop buckets older than the window, plus any entry in the backing
    /// cache that does not parse as a bucket (debris from a shared
    /// directory).
    async fn prune(&self, current_minute: i64) -> Result<()> {
        for (key, _) in self.buckets.entries().await? {
            let stale = match parse_minute(&key) {
                Some(minute) => current_minute - minute > i64::from(self.window_minutes),
                None => true,
            };
            if stale {
                debug!(key = %key, "Pruning stale rate bucket");
                self.buckets.remove(&key).await?;
            }
        }
        Ok(())
    }

    fn current_minute() -> i64 {
        Utc::now().timestamp().div_euclid(60)
    }
}

fn parse_minute(key: &str) -> Option<i64> {
    key.parse().ok()
}

fn parse_count(entry: &CacheEntry) -> Option<u64> {
    std::str::from_utf8(&entry.value).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use file_kv_cache::{DiskCache, DiskCacheConfig};
    use tempfile::tempdir;

    async fn bucket_cache(dir: &std::path::Path) -> Arc<dyn Cache> {
        let disk = DiskCache::new(DiskCacheConfig {
            cache_dir: dir.to_path_buf(),
            max_entries: 1000,
            ttl_secs: 24 * 60 * 60,
        });
        disk.init().await.unwrap();
        Arc::new(disk)
    }

    async fn ready_tracker(dir: &std::path::Path) -> RateTracker {
        RateTracker::new(bucket_cache(dir).await)
    }

    fn current_minute() -> i64 {
        Utc::now().timestamp().div_euclid(60)
    }

    #[tokio::test]
    async fn test_five_increments_count_to_five() {
        let dir = tempdir().unwrap();
        let tracker = ready_tracker(dir.path()).await;

        for _ in 0..5 {
            tracker.increment().await.unwrap();
        }

        assert_eq!(tracker.count(60).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_count_rejects_non_minute_periods() {
        let dir = tempdir().unwrap();
        let tracker = ready_tracker(dir.path()).await;

        for period in [0, 1, 59, 90, 61] {
            assert!(matches!(
                tracker.count(period).await,
                Err(TrackerError::InvalidPeriod(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_count_rejects_periods_beyond_retention() {
        let dir = tempdir().unwrap();
        let cache = bucket_cache(dir.path()).await;
        let tracker = RateTracker::with_window(cache, 10);

        assert_eq!(tracker.count(600).await.unwrap(), 0);
        assert!(matches!(
            tracker.count(660).await,
            Err(TrackerError::InvalidPeriod(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_window_is_clamped_to_one_minute() {
        let dir = tempdir().unwrap();
        let cache = bucket_cache(dir.path()).await;
        let tracker = RateTracker::with_window(cache, 0);

        assert_eq!(tracker.window_minutes(), 1);
        tracker.increment().await.unwrap();
        assert_eq!(tracker.count(60).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_increment_prunes_buckets_past_window() {
        let dir = tempdir().unwrap();
        let tracker = ready_tracker(dir.path()).await;

        // Plant a bucket two hours old, beyond the 60-minute window.
        let stale_key = (current_minute() - 120).to_string();
        tracker.buckets.set(&stale_key, b"7").await.unwrap();

        tracker.increment().await.unwrap();

        assert!(tracker.buckets.get(&stale_key).await.unwrap().is_none());
        assert_eq!(tracker.count(3600).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_increment_prunes_debris_entries() {
        let dir = tempdir().unwrap();
        let tracker = ready_tracker(dir.path()).await;

        tracker.buckets.set("not-a-minute", b"junk").await.unwrap();
        tracker.increment().await.unwrap();

        assert!(tracker.buckets.get("not-a-minute").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_respects_period_boundary() {
        let dir = tempdir().unwrap();
        let tracker = ready_tracker(dir.path()).await;

        // A bucket from the previous minute plus one live increment.
        let previous = (current_minute() - 1).to_string();
        tracker.buckets.set(&previous, b"3").await.unwrap();
        tracker.increment().await.unwrap();

        assert_eq!(tracker.count(120).await.unwrap(), 4);
        // The previous minute falls outside a 60-second period unless the
        // clock rolled over mid-test, in which case both buckets count.
        let last_minute = tracker.count(60).await.unwrap();
        assert!(last_minute == 1 || last_minute == 4);
    }

    #[tokio::test]
    async fn test_empty_tracker_counts_zero() {
        let dir = tempdir().unwrap();
        let tracker = ready_tracker(dir.path()).await;

        assert_eq!(tracker.count(60).await.unwrap(), 0);
        assert_eq!(tracker.count(3600).await.unwrap(), 0);
    }
}
