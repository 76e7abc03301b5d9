//! Fetched response representation and its cached form

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::Result;

/// A successful page retrieval: status, declared content type, and the
/// raw body bytes. Extraction collaborators read `text` for HTML and
/// `body` for binary payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Serialize for storage in a response cache.
    pub(crate) fn to_cached_bytes(&self) -> Result<Vec<u8>> {
        let record = CachedResponse {
            url: self.url.clone(),
            status: self.status,
            content_type: self.content_type.clone(),
            body: BASE64.encode(&self.body),
        };
        Ok(serde_json::to_vec(&record)?)
    }

    /// Deserialize a record previously stored by `to_cached_bytes`.
    pub(crate) fn from_cached_bytes(bytes: &[u8]) -> Result<Self> {
        let record: CachedResponse = serde_json::from_slice(bytes)?;
        Ok(Self {
            url: record.url,
            status: record.status,
            content_type: record.content_type,
            body: BASE64.decode(record.body.as_bytes())?,
        })
    }
}

/// JSON form of a cached response; the body travels as base64.
#[derive(Debug, Serialize, Deserialize)]
struct CachedResponse {
    url: String,
    status: u16,
    content_type: String,
    body: String,
}
