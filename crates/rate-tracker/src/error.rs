//! Error types for the rate tracker

use file_kv_cache::CacheError;
use std::fmt;

#[derive(Debug)]
pub enum TrackerError {
    /// The queried period is zero, not minute-aligned, or longer than the
    /// retention window.
    InvalidPeriod(String),
    /// The backing bucket cache failed.
    Cache(CacheError),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::InvalidPeriod(msg) => write!(f, "Invalid period: {}", msg),
            TrackerError::Cache(err) => write!(f, "Bucket cache error: {}", err),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Cache(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CacheError> for TrackerError {
    fn from(err: CacheError) -> Self {
        TrackerError::Cache(err)
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_period_display() {
        let err = TrackerError::InvalidPeriod("must be a multiple of 60".to_string());
        assert_eq!(format!("{}", err), "Invalid period: must be a multiple of 60");
    }

    #[test]
    fn test_cache_error_has_source() {
        let err = TrackerError::from(CacheError::InvalidKey("..".to_string()));
        assert!(std::error::Error::source(&err).is_some());
    }
}
