//! Lenient timestamp decoding.
//!
//! The worker emits RFC 3339 values for some records and naive ISO-8601 date-times
//! (no offset) for others. Naive values are interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

use crate::types::errors::TimestampError;
use crate::types::Timestamp;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(value: &str) -> Result<Timestamp, TimestampError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::InvalidFormat(value.to_string()))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse(&value).map_err(de::Error::custom)
}
