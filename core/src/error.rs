//! Error types for the catalog client.
//!
//! # Design
//! `ApiError` separates the three ways a round-trip can fail: the request
//! never got a response (`Network`), the server answered with a non-2xx
//! status (`Http`), or a 2xx body could not be decoded (`Decode`). Request
//! side failures (`Serialization`, `Invalid`) never leave the process.

use thiserror::Error;

/// Errors returned by `CatalogClient`, `ResourceClient` and `Catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response reached the client.
    #[error("network error: {0}")]
    Network(String),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx body could not be deserialized into the expected type.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request payload was rejected before it was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Client-side checks on request payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` must not be blank")]
    Blank(&'static str),

    #[error("field `{0}` must not be zero")]
    Zero(&'static str),

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

/// The primary title fetch failed; nothing can be shown for `id`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not load title `{id}`: {source}")]
pub struct AggregateLoadFailed {
    pub id: String,
    #[source]
    pub source: ApiError,
}
