//! Error types for the file-backed key/value cache

use std::fmt;

#[derive(Debug)]
pub enum CacheError {
    /// The key is empty or would escape the cache directory.
    InvalidKey(String),
    /// Disk I/O failed while persisting, reading, or removing an entry.
    Io(Box<std::io::Error>),
    /// A stored entry envelope could not be encoded or decoded.
    Envelope(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidKey(key) => write!(f, "Invalid cache key: {}", key),
            CacheError::Io(err) => write!(f, "Cache I/O error: {}", err),
            CacheError::Envelope(msg) => write!(f, "Cache envelope error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Envelope(err.to_string())
    }
}

impl From<base64::DecodeError> for CacheError {
    fn from(err: base64::DecodeError) -> Self {
        CacheError::Envelope(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
