//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! `ForrstClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network; a [`Transport`] executes the actual
//! round-trip. Every Forrst endpoint is a GET, so a request is just an
//! absolute path, its query pairs, and its headers.

use url::Url;

use crate::error::ApiError;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without the query string.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Render the absolute URL with the percent-encoded query string.
    pub fn url(&self) -> Result<Url, ApiError> {
        let url = if self.query.is_empty() {
            Url::parse(&self.path)
        } else {
            Url::parse_with_params(&self.path, &self.query)
        };
        url.map_err(|e| ApiError::Transport(format!("invalid request URL {}: {e}", self.path)))
    }

    /// Look up a query value by key.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a [`Transport`] and consumed by `ForrstClient::parse_*`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes a request against the network.
///
/// Implementations must return non-2xx responses as data and reserve
/// `Err(ApiError::Transport)` for failures that produced no response at all.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}
