//! Error types for the Forrst API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses and `"stat": "fail"` envelopes land in
//! `Upstream`. `ApiError::kind` collapses the variants into the four groups a
//! caller actually branches on.

use thiserror::Error;

/// Errors raised while loading a [`Config`](crate::Config).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("failed to parse {name} as integer: {value}")]
    ParseInt { name: String, value: String },
}

/// Errors returned by the request builders, parsers, and gateways.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The body was not JSON, or the JSON did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A timestamp field did not match `%Y-%m-%d %H:%M:%S`.
    #[error("field `{field}` is not a valid timestamp: {value:?}")]
    TimestampParse { field: &'static str, value: String },

    /// A lookup selector was neither a non-negative integer nor a non-empty
    /// string.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A listing option carried a value of the wrong type.
    #[error("invalid value for option `{key}`: {value:?}")]
    InvalidOption { key: String, value: String },

    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404, or an error
    /// envelope.
    #[error("upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something the API cannot accept; fix the call.
    BadInput,
    /// The server answered with something this client cannot map.
    MalformedResponse,
    /// Network or authentication plumbing failed before a response arrived.
    Transport,
    /// The server answered with an error.
    Upstream,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidSelector(_) | ApiError::InvalidOption { .. } | ApiError::Config(_) => {
                ErrorKind::BadInput
            }
            ApiError::Decode(_) | ApiError::TimestampParse { .. } => ErrorKind::MalformedResponse,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::NotFound | ApiError::Upstream { .. } => ErrorKind::Upstream,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Decode(error.to_string())
    }
}
