//! Keyed stream producer
//!
//! Appends messages to a stream as `key` + `payload` field pairs. The key
//! carries the producer's partition/ordering identity (here one stream is
//! totally ordered, so the key is metadata the consumer can read back).
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_broker::{StreamProducer, StreamDef};
//!
//! let producer = StreamProducer::from_stream_def::<ActivityStream>(client);
//! let stream_id = producer.send("42", &event).await?;
//! ```

use redis::aio::ConnectionManager;
use serde::Serialize;
use tracing::debug;

use crate::client::BrokerClient;
use crate::error::BrokerError;
use crate::registry::StreamDef;

/// Stream producer bound to one stream.
///
/// Holds a clone of the broker client: when the client is disconnected,
/// `send` fails fast with `NotConnected` instead of buffering.
#[derive(Clone)]
pub struct StreamProducer {
    client: BrokerClient,
    stream_name: String,
    max_length: i64,
}

impl StreamProducer {
    /// Create a new StreamProducer for a specific stream.
    pub fn new(client: BrokerClient, stream_name: impl Into<String>) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
            max_length: 100_000,
        }
    }

    /// Create a producer from a `StreamDef` implementation.
    ///
    /// This is the recommended way to create a producer as it ensures
    /// the stream name and trim length are consistent with the worker.
    pub fn from_stream_def<S: StreamDef>(client: BrokerClient) -> Self {
        Self {
            client,
            stream_name: S::STREAM_NAME.to_string(),
            max_length: S::MAX_LENGTH,
        }
    }

    /// Set the maximum stream length (MAXLEN ~).
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Get the stream name.
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Whether the underlying client currently holds a connection.
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Append a message keyed by `key`.
    ///
    /// Returns the Redis stream entry ID. Fails fast with `NotConnected`
    /// when the client has no connection.
    pub async fn send<T: Serialize>(&self, key: &str, message: &T) -> Result<String, BrokerError> {
        let mut conn: ConnectionManager = self.client.connection().await?;

        let payload = serde_json::to_string(message)?;

        // XADD with MAXLEN ~ for approximate trimming (more efficient)
        let stream_id: String = redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg("key")
            .arg(key)
            .arg("payload")
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        debug!(
            stream = %self.stream_name,
            stream_id = %stream_id,
            key = %key,
            "Appended message"
        );

        Ok(stream_id)
    }
}
