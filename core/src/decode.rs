//! Response decoding: raw text or pre-parsed JSON in, `serde_json::Value` out.
//!
//! Forrst wraps every payload in an envelope:
//!
//! ```json
//! {"stat": "ok", "in": 0.012, "authed": false, "resp": { ... }}
//! ```
//!
//! Failures use the same envelope with `"stat": "fail"` and an
//! `resp.error` message. The location of the payload inside `resp` differs
//! per endpoint and is passed explicitly by each parser.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Input accepted by [`decode`] and the record `decode` constructors.
#[derive(Debug, Clone)]
pub enum Payload<'a> {
    Text(Cow<'a, str>),
    Structured(Cow<'a, Value>),
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Payload::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for Payload<'static> {
    fn from(text: String) -> Self {
        Payload::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a Value> for Payload<'a> {
    fn from(value: &'a Value) -> Self {
        Payload::Structured(Cow::Borrowed(value))
    }
}

impl From<Value> for Payload<'static> {
    fn from(value: Value) -> Self {
        Payload::Structured(Cow::Owned(value))
    }
}

/// Parse text into JSON; structured input passes through untouched.
pub fn decode<'a>(payload: impl Into<Payload<'a>>) -> Result<Cow<'a, Value>, ApiError> {
    match payload.into() {
        Payload::Text(text) => serde_json::from_str(&text)
            .map(Cow::Owned)
            .map_err(|e| ApiError::Decode(format!("invalid JSON: {e}"))),
        Payload::Structured(value) => Ok(value),
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::Upstream {
            status,
            message: error_message(&response.body).unwrap_or_else(|| response.body.clone()),
        }),
    }
}

/// Reject `"stat": "fail"` envelopes, then walk `path` down to the payload.
pub fn open_envelope<'v>(value: &'v Value, path: &[&str]) -> Result<&'v Value, ApiError> {
    if value.get("stat").and_then(Value::as_str) == Some("fail") {
        let message = value
            .pointer("/resp/error")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(ApiError::Upstream { status: 200, message });
    }

    let mut current = value;
    for key in path {
        current = current
            .get(key)
            .ok_or_else(|| ApiError::Decode(format!("missing `{key}` in response envelope")))?;
    }
    Ok(current)
}

/// Records passed to a `decode` constructor may still sit in their `resp`
/// envelope, as a raw `users/info` body does.
pub(crate) fn unwrap_record(value: &Value) -> Result<&Value, ApiError> {
    if value.get("resp").is_some_and(Value::is_object) {
        open_envelope(value, &["resp"])
    } else {
        Ok(value)
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/resp/error")
        .and_then(Value::as_str)
        .map(str::to_string)
}
