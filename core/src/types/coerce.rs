//! Field-level coercions shared by the record mappers.
//!
//! Forrst is inconsistent about scalar encodings: counts arrive as numbers or
//! numeric strings, booleans as `true`, `"1"` or `1`, tags as either a comma
//! string or an array. Each helper accepts every observed encoding.
//!
//! Counts are lenient: fractional values are truncated, anything without a
//! leading integer becomes `0` and is logged at `warn`. Identifiers and
//! timestamps are strict.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, ApiError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        ApiError::TimestampParse { field, value: value.to_string() }
    })
}

/// Split a delimited string into trimmed, non-empty tokens.
pub(crate) fn split_tokens(raw: &str, delimiter: char) -> impl Iterator<Item = &str> {
    raw.split(delimiter).map(str::trim).filter(|t| !t.is_empty())
}

pub(crate) mod count {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => match (n.as_u64(), n.as_f64()) {
                (Some(count), _) => count,
                (None, Some(f)) if f.is_finite() && f >= 0.0 => f.trunc() as u64,
                _ => fallback(&n.to_string()),
            },
            Some(Value::String(s)) => leading_integer(&s).unwrap_or_else(|| fallback(&s)),
            Some(other) => fallback(&other.to_string()),
        })
    }

    /// `"12.5"` → 12, `"32 posts"` → 32, `"n/a"` → `None`.
    fn leading_integer(raw: &str) -> Option<u64> {
        let raw = raw.trim();
        let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
        raw[..end].parse().ok()
    }

    fn fallback(raw: &str) -> u64 {
        warn!(value = raw, "count is not a non-negative integer, using 0");
        0
    }
}

pub(crate) mod id {
    use serde::de::Error as _;

    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| D::Error::custom(format!("invalid id {n}"))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid id {s:?}"))),
            other => Err(D::Error::custom(format!("invalid id {other}"))),
        }
    }
}

pub(crate) mod flag {
    use serde::de::Error as _;

    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(D::Error::custom(format!("invalid boolean {n}"))),
            },
            Some(Value::String(s)) => match s.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                other => Err(D::Error::custom(format!("invalid boolean {other:?}"))),
            },
            Some(other) => Err(D::Error::custom(format!("invalid boolean {other}"))),
        }
    }
}

pub(crate) mod tags {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagField {
        List(Vec<String>),
        Delimited(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<TagField>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(TagField::Delimited(raw)) => split_tokens(&raw, ',').map(str::to_string).collect(),
            Some(TagField::List(items)) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}
