use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ParseError;

/// `2024-01-01T00:00:00.000000Z`, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6fZ";

#[derive(Debug, Deserialize)]
pub struct Envelope {
    /* NOTE: other server messages carry no `data` and are ignored */
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

/// `"lastUpdated": null` deserializes to `None` and is treated the same as a missing key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub quantity: Option<i64>,

    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Envelope {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(raw)?)
    }
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| ParseError::Timestamp {
            value: value.to_string(),
            source,
        })
}
