//! # Request ID Tracking
//!
//! Request identifiers propagated through the `x-request-id` header and
//! attached to every request span. Generated with CUID2.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random request ID.
    #[inline]
    pub fn new() -> Self { Self(cuid2::create_id()) }

    /// Accept a client supplied id when it looks sane.
    ///
    /// Ids must be 8..=64 characters of `[A-Za-z0-9_-]`; anything else is
    /// dropped so that header values cannot inject into log lines.
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        let valid = (8 ..= 64).contains(&value.len()) &&
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(value.to_string()))
    }

    /// Use the header value if valid, otherwise mint a new id.
    pub fn from_header_or_new(value: Option<&str>) -> Self { value.and_then(Self::from_header).unwrap_or_default() }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }

    #[inline]
    pub fn into_string(self) -> String { self.0 }
}

impl Default for RequestId {
    #[inline]
    fn default() -> Self { Self::new() }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
