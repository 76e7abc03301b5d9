//! Rate-accounted HTTP retrieval with optional response caching
//!
//! Wraps outbound GETs with a sliding-window request counter and, when a
//! response cache is attached, cache-aside read-through: hits skip both
//! the network call and the rate accounting.

pub mod error;
pub mod fetcher;
pub mod response;

pub use error::{FetchError, Result};
pub use fetcher::Fetcher;
pub use response::FetchResponse;
