//! Stream consumer for Redis operations
//!
//! Handles reading messages from a stream using consumer groups. Deliveries
//! come back raw; acknowledgement and payload parsing belong to the worker.

use redis::RedisResult;
use tracing::{debug, info, warn};

use crate::client::BrokerClient;
use crate::config::WorkerConfig;
use crate::delivery::Delivery;
use crate::error::BrokerError;

type StreamEntries = Vec<(String, Vec<(String, String)>)>;
type StreamReadReply = Vec<(String, StreamEntries)>;

/// Stream consumer bound to one consumer group.
pub struct StreamConsumer {
    client: BrokerClient,
    config: WorkerConfig,
}

impl StreamConsumer {
    /// Create a new StreamConsumer
    pub fn new(client: BrokerClient, config: WorkerConfig) -> Self {
        Self { client, config }
    }

    /// Get the broker client
    pub fn client(&self) -> &BrokerClient {
        &self.client
    }

    /// Get the stream name
    pub fn stream_name(&self) -> &str {
        &self.config.stream_name
    }

    /// Get the consumer group
    pub fn consumer_group(&self) -> &str {
        &self.config.consumer_group
    }

    /// Get the consumer ID
    pub fn consumer_id(&self) -> &str {
        &self.config.consumer_id
    }

    /// Initialize the consumer group if it doesn't exist.
    ///
    /// The group is created at the stream end (`$`): a new group starts with
    /// messages published from now on and does not replay the backlog.
    pub async fn init_consumer_group(&self) -> Result<(), BrokerError> {
        let mut conn = self.client.connection().await?;

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$") // Subscribe from the current end
            .arg("MKSTREAM") // Create stream if it doesn't exist
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group at stream end"
                );
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Consumer group already exists"
                );
            }
            Err(e) => return Err(BrokerError::Redis(e)),
        }

        Ok(())
    }

    /// Read this consumer's pending messages (delivered but not acknowledged,
    /// e.g. in flight when a previous run crashed).
    pub async fn read_pending(&self) -> Result<Vec<Delivery>, BrokerError> {
        let mut conn = self.client.connection().await?;

        let result: RedisResult<StreamReadReply> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(self.config.batch_size)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg("0") // Read own pending entries
            .query_async(&mut conn)
            .await;

        match result {
            Ok(streams) => Ok(Self::parse_stream_response(streams)),
            Err(e) if e.to_string().contains("NOGROUP") => {
                // Consumer group doesn't exist yet
                Ok(vec![])
            }
            Err(e) => Err(BrokerError::Redis(e)),
        }
    }

    /// Read new messages from the stream, blocking up to the configured
    /// timeout when none are available.
    pub async fn read_new(&self) -> Result<Vec<Delivery>, BrokerError> {
        let mut conn = self.client.connection().await?;

        let result: RedisResult<Option<StreamReadReply>> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("BLOCK")
            .arg(self.config.block_timeout_ms)
            .arg("COUNT")
            .arg(self.config.batch_size)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(">") // Only new messages
            .query_async(&mut conn)
            .await;

        match result {
            Ok(Some(streams)) => Ok(Self::parse_stream_response(streams)),
            Ok(None) => Ok(vec![]), // No messages (blocking timeout)
            Err(e) if e.to_string().contains("NOGROUP") => {
                // Consumer group doesn't exist yet
                Ok(vec![])
            }
            Err(e) => Err(BrokerError::Redis(e)),
        }
    }

    /// Acknowledge a message
    pub async fn ack(&self, stream_id: &str) -> Result<(), BrokerError> {
        let mut conn = self.client.connection().await?;

        let _: i64 = redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(stream_id)
            .query_async(&mut conn)
            .await?;

        debug!(stream_id = %stream_id, "Acknowledged message");
        Ok(())
    }

    /// Claim messages abandoned by other consumers.
    ///
    /// Entries pending longer than `claim_idle_ms` are reassigned to this
    /// consumer and returned for processing. This is what turns
    /// "unacknowledged" into "redelivered" while the group stays alive.
    pub async fn claim_abandoned(&self) -> Result<Vec<Delivery>, BrokerError> {
        let mut conn = self.client.connection().await?;

        // First, get pending entries info
        let pending: RedisResult<Vec<(String, String, i64, i64)>> = redis::cmd("XPENDING")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("-")
            .arg("+")
            .arg(self.config.batch_size)
            .query_async(&mut conn)
            .await;

        let pending = match pending {
            Ok(p) => p,
            Err(e) if e.to_string().contains("NOGROUP") => return Ok(vec![]),
            Err(e) => return Err(BrokerError::Redis(e)),
        };

        if pending.is_empty() {
            return Ok(vec![]);
        }

        // Filter for messages that are old enough to claim
        let claim_ids: Vec<String> = pending
            .iter()
            .filter(|(_, _, idle_time, _)| *idle_time > self.config.claim_idle_ms as i64)
            .map(|(id, _, _, _)| id.clone())
            .collect();

        if claim_ids.is_empty() {
            return Ok(vec![]);
        }

        // Claim the messages
        let mut cmd = redis::cmd("XCLAIM");
        cmd.arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg(self.config.claim_idle_ms);

        for id in &claim_ids {
            cmd.arg(id);
        }

        let result: RedisResult<StreamEntries> = cmd.query_async(&mut conn).await;

        match result {
            Ok(entries) => {
                let deliveries = Self::parse_entries(entries);
                if !deliveries.is_empty() {
                    warn!(count = deliveries.len(), "Claimed abandoned messages");
                }
                Ok(deliveries)
            }
            Err(e) => Err(BrokerError::Redis(e)),
        }
    }

    /// Parse a XREADGROUP reply (per-stream groups of entries)
    fn parse_stream_response(streams: StreamReadReply) -> Vec<Delivery> {
        streams
            .into_iter()
            .flat_map(|(_stream_name, entries)| Self::parse_entries(entries))
            .collect()
    }

    /// Parse raw entries into deliveries
    fn parse_entries(entries: StreamEntries) -> Vec<Delivery> {
        entries
            .into_iter()
            .map(|(stream_id, fields)| Delivery::from_fields(stream_id, fields))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;

    fn consumer() -> StreamConsumer {
        StreamConsumer::new(
            BrokerClient::new(BrokerConfig::default()),
            WorkerConfig::new("test-stream", "test-group").with_consumer_id("worker-1"),
        )
    }

    #[test]
    fn test_accessors() {
        let consumer = consumer();
        assert_eq!(consumer.stream_name(), "test-stream");
        assert_eq!(consumer.consumer_group(), "test-group");
        assert_eq!(consumer.consumer_id(), "worker-1");
    }

    #[test]
    fn test_parse_stream_response() {
        let streams = vec![(
            "test-stream".to_string(),
            vec![
                (
                    "1-0".to_string(),
                    vec![
                        ("key".to_string(), "7".to_string()),
                        ("payload".to_string(), "{}".to_string()),
                    ],
                ),
                ("2-0".to_string(), vec![]),
            ],
        )];

        let deliveries = StreamConsumer::parse_stream_response(streams);
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].key.as_deref(), Some("7"));
        assert!(deliveries[1].payload.is_none());
    }

    #[tokio::test]
    async fn test_reads_require_connection() {
        let consumer = consumer();
        assert!(matches!(
            consumer.read_new().await,
            Err(BrokerError::NotConnected)
        ));
        assert!(matches!(
            consumer.ack("1-0").await,
            Err(BrokerError::NotConnected)
        ));
    }
}
