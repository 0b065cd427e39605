//! Raw message delivery
//!
//! Wraps one stream entry as delivered to a consumer. Payload parsing is the
//! worker's decision, not the consumer's: an unparseable payload must still
//! be acknowledged and dropped rather than silently skipped.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::BrokerError;

/// One entry read from the stream, before payload parsing.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Redis stream entry ID (e.g., "1234567890123-0")
    pub stream_id: String,

    /// The partition/ordering key the producer sent with the message
    pub key: Option<String>,

    /// The serialized payload, if the entry carried one
    pub payload: Option<String>,

    /// When the entry was appended (parsed from the stream ID)
    pub timestamp: DateTime<Utc>,
}

impl Delivery {
    /// Build a delivery from a raw entry's field pairs.
    pub fn from_fields(stream_id: String, fields: Vec<(String, String)>) -> Self {
        let mut key = None;
        let mut payload = None;

        for (name, value) in fields {
            match name.as_str() {
                "key" => key = Some(value),
                "payload" => payload = Some(value),
                _ => {}
            }
        }

        let timestamp = Self::parse_timestamp(&stream_id);
        Self {
            stream_id,
            key,
            payload,
            timestamp,
        }
    }

    /// Parse the payload as JSON.
    ///
    /// A missing payload field and malformed JSON both surface as
    /// `Serialization` errors (permanent).
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, BrokerError> {
        let raw = self
            .payload
            .as_deref()
            .ok_or_else(|| BrokerError::Serialization("missing payload field".to_string()))?;

        serde_json::from_str(raw).map_err(BrokerError::from)
    }

    /// Parse timestamp from a Redis stream ID ("timestamp_ms-sequence").
    fn parse_timestamp(stream_id: &str) -> DateTime<Utc> {
        stream_id
            .split('-')
            .next()
            .and_then(|ts| ts.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }

    /// Age of the entry in milliseconds.
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.timestamp).num_milliseconds()
    }
}
