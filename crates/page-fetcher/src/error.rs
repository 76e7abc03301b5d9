//! Error types for the page fetcher

use file_kv_cache::CacheError;
use rate_tracker::TrackerError;
use std::fmt;

#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure: timeout, refused connection, bad TLS.
    Http(Box<reqwest::Error>),
    /// The server answered with a non-success status. Never cached.
    Status { status: u16, url: String },
    /// The response cache failed.
    Cache(CacheError),
    /// The rate tracker failed.
    Tracker(TrackerError),
    /// A cached response record could not be encoded or decoded.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "HTTP error: {}", err),
            FetchError::Status { status, url } => write!(f, "HTTP {} for: {}", status, url),
            FetchError::Cache(err) => write!(f, "Response cache error: {}", err),
            FetchError::Tracker(err) => write!(f, "Rate tracker error: {}", err),
            FetchError::Decode(msg) => write!(f, "Cached response decode error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err.as_ref()),
            FetchError::Cache(err) => Some(err),
            FetchError::Tracker(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(Box::new(err))
    }
}

impl From<CacheError> for FetchError {
    fn from(err: CacheError) -> Self {
        FetchError::Cache(err)
    }
}

impl From<TrackerError> for FetchError {
    fn from(err: TrackerError) -> Self {
        FetchError::Tracker(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for FetchError {
    fn from(err: base64::DecodeError) -> Self {
        FetchError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
