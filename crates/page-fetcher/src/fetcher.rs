//! Cache-aside page retrieval with request accounting

use reqwest::Client;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{FetchError, Result};
use crate::response::FetchResponse;
use file_kv_cache::Cache;
use rate_tracker::RateTracker;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "page-fetcher/0.1";

/// Fetches URLs through an optional response cache, counting every real
/// network request against a sliding-window rate tracker. Cache hits cost
/// neither a network call nor an increment.
pub struct Fetcher {
    client: Client,
    tracker: RateTracker,
    url_cache: Option<Arc<dyn Cache>>,
}

impl Fetcher {
    /// Fetcher with rate accounting only; every call goes to the network.
    pub fn new(tracker: RateTracker) -> Self {
        Self::with_cache(tracker, None)
    }

    /// Fetcher with an attached response cache for cache-aside reads.
    pub fn with_cache(tracker: RateTracker, url_cache: Option<Arc<dyn Cache>>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            tracker,
            url_cache,
        }
    }

    pub fn tracker(&self) -> &RateTracker {
        &self.tracker
    }

    /// Map a URL to a deterministic filesystem-safe cache key.
    pub fn url_key(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Retrieve `url`.
    ///
    /// With `use_cache` and an attached cache, a live cached response is
    /// returned as-is. Otherwise the request is counted, performed, and a
    /// success response stored back (when caching is on). Non-2xx answers
    /// fail with `FetchError::Status` and are never cached.
    pub async fn fetch(&self, url: &str, use_cache: bool) -> Result<FetchResponse> {
        let key = Self::url_key(url);

        if use_cache {
            if let Some(cache) = &self.url_cache {
                if let Some(entry) = cache.get(&key).await? {
                    debug!(url = %url, "Response cache hit");
                    return FetchResponse::from_cached_bytes(&entry.value);
                }
                debug!(url = %url, "Response cache miss");
            }
        }

        self.tracker.increment().await?;
        match self.tracker.count(60).await {
            Ok(recent) => info!(url = %url, requests_last_minute = recent, "Fetching page"),
            Err(err) => debug!(url = %url, error = %err, "Request count unavailable"),
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Fetch returned non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await?.to_vec();

        let fetched = FetchResponse {
            url: url.to_string(),
            status: status.as_u16(),
            content_type,
            body,
        };

        if use_cache {
            if let Some(cache) = &self.url_cache {
                cache.set(&key, &fetched.to_cached_bytes()?).await?;
                debug!(url = %url, size = fetched.body.len(), "Cached response");
            }
        }

        Ok(fetched)
    }
}
