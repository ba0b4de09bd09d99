use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce;
use crate::decode::{decode, unwrap_record, Payload};
use crate::error::ApiError;

/// Service-wide API usage for the current credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "coerce::count::deserialize")]
    pub rate_limit: u64,
    #[serde(default, deserialize_with = "coerce::count::deserialize")]
    pub calls_made: u64,
}

impl Stats {
    pub fn decode<'a>(payload: impl Into<Payload<'a>>) -> Result<Self, ApiError> {
        let value = decode(payload)?;
        Self::from_value(unwrap_record(&value)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        Ok(Stats::deserialize(value)?)
    }

    pub fn calls_remaining(&self) -> u64 {
        self.rate_limit.saturating_sub(self.calls_made)
    }
}
