//! Broker and worker configuration
//!
//! `BrokerConfig` controls how the client connects; `WorkerConfig` controls
//! how a consumer-group worker reads.

use crate::registry::StreamDef;
use uuid::Uuid;

/// Configuration for the broker client connection
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Broker connection URL
    pub url: String,

    /// Maximum connection attempts before giving up
    pub connect_attempts: u32,

    /// Fixed delay between connection attempts in milliseconds
    pub connect_backoff_ms: u64,
}

impl BrokerConfig {
    /// Create a config with the default retry budget (5 attempts, 300ms apart)
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_attempts: 5,
            connect_backoff_ms: 300,
        }
    }

    /// Set the maximum connection attempts (minimum 1)
    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts.max(1);
        self
    }

    /// Set the fixed backoff between attempts
    pub fn with_connect_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.connect_backoff_ms = backoff_ms;
        self
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

/// Load BrokerConfig from environment variables
///
/// Environment variables:
/// - `BROKER_URL` or `REDIS_URL` (optional, default `redis://127.0.0.1:6379`)
/// - `BROKER_CONNECT_ATTEMPTS` (optional, default 5)
/// - `BROKER_CONNECT_BACKOFF_MS` (optional, default 300)
#[cfg(feature = "config")]
impl core_config::FromEnv for BrokerConfig {
    fn from_env() -> Result<Self, core_config::ConfigError> {
        let url = std::env::var("BROKER_URL")
            .or_else(|_| std::env::var("REDIS_URL"))
            .unwrap_or_else(|_| BrokerConfig::default().url);

        let defaults = BrokerConfig::new(url);
        let connect_attempts = core_config::env_parse_or_default(
            "BROKER_CONNECT_ATTEMPTS",
            defaults.connect_attempts,
        )?;
        let connect_backoff_ms = core_config::env_parse_or_default(
            "BROKER_CONNECT_BACKOFF_MS",
            defaults.connect_backoff_ms,
        )?;

        Ok(defaults
            .with_connect_attempts(connect_attempts)
            .with_connect_backoff_ms(connect_backoff_ms))
    }
}

/// Configuration for the stream worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Redis stream name
    pub stream_name: String,

    /// Consumer group name
    pub consumer_group: String,

    /// Unique consumer ID (auto-generated if not provided)
    pub consumer_id: String,

    /// Batch size for reading messages
    pub batch_size: usize,

    /// Blocking read timeout in milliseconds
    pub block_timeout_ms: u64,

    /// Pending entries idle longer than this are claimed from their consumer
    pub claim_idle_ms: u64,

    /// How often to sweep for abandoned pending entries, in seconds
    pub claim_interval_secs: u64,
}

impl WorkerConfig {
    /// Create a new WorkerConfig from a StreamDef
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self::new(S::STREAM_NAME, S::CONSUMER_GROUP)
    }

    /// Create a new WorkerConfig with explicit values
    pub fn new(stream_name: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            batch_size: 10,
            block_timeout_ms: 5000,
            claim_idle_ms: 30_000,
            claim_interval_secs: 60,
        }
    }

    /// Set the consumer ID
    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the blocking read timeout
    pub fn with_block_timeout_ms(mut self, timeout: u64) -> Self {
        self.block_timeout_ms = timeout;
        self
    }

    /// Set the claim idle threshold for abandoned messages
    pub fn with_claim_idle_ms(mut self, idle: u64) -> Self {
        self.claim_idle_ms = idle;
        self
    }

    /// Set the claim sweep interval
    pub fn with_claim_interval_secs(mut self, secs: u64) -> Self {
        self.claim_interval_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestStream;

    impl StreamDef for TestStream {
        const STREAM_NAME: &'static str = "test-stream";
        const CONSUMER_GROUP: &'static str = "test-group";
    }

    #[test]
    fn test_broker_config_defaults() {
        let config = BrokerConfig::new("redis://localhost:6379");
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.connect_attempts, 5);
        assert_eq!(config.connect_backoff_ms, 300);
    }

    #[test]
    fn test_broker_config_attempts_floor() {
        let config = BrokerConfig::default().with_connect_attempts(0);
        assert_eq!(config.connect_attempts, 1);
    }

    #[test]
    fn test_from_stream_def() {
        let config = WorkerConfig::from_stream_def::<TestStream>();

        assert_eq!(config.stream_name, "test-stream");
        assert_eq!(config.consumer_group, "test-group");
        assert!(config.consumer_id.starts_with("worker-"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = WorkerConfig::new("my-stream", "my-group")
            .with_consumer_id("worker-1")
            .with_batch_size(20)
            .with_block_timeout_ms(1000)
            .with_claim_idle_ms(10_000)
            .with_claim_interval_secs(30);

        assert_eq!(config.stream_name, "my-stream");
        assert_eq!(config.consumer_id, "worker-1");
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.block_timeout_ms, 1000);
        assert_eq!(config.claim_idle_ms, 10_000);
        assert_eq!(config.claim_interval_secs, 30);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_broker_config_from_env_prefers_broker_url() {
        use core_config::FromEnv;

        temp_env::with_vars(
            [
                ("BROKER_URL", Some("redis://broker:6379")),
                ("REDIS_URL", Some("redis://other:6379")),
                ("BROKER_CONNECT_ATTEMPTS", None::<&str>),
                ("BROKER_CONNECT_BACKOFF_MS", None::<&str>),
            ],
            || {
                let config = BrokerConfig::from_env().unwrap();
                assert_eq!(config.url, "redis://broker:6379");
                assert_eq!(config.connect_attempts, 5);
                assert_eq!(config.connect_backoff_ms, 300);
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_broker_config_from_env_falls_back_to_redis_url() {
        use core_config::FromEnv;

        temp_env::with_vars(
            [
                ("BROKER_URL", None::<&str>),
                ("REDIS_URL", Some("redis://shared:6379")),
                ("BROKER_CONNECT_ATTEMPTS", Some("2")),
                ("BROKER_CONNECT_BACKOFF_MS", Some("50")),
            ],
            || {
                let config = BrokerConfig::from_env().unwrap();
                assert_eq!(config.url, "redis://shared:6379");
                assert_eq!(config.connect_attempts, 2);
                assert_eq!(config.connect_backoff_ms, 50);
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_broker_config_from_env_uses_fallback_endpoint() {
        use core_config::FromEnv;

        temp_env::with_vars(
            [("BROKER_URL", None::<&str>), ("REDIS_URL", None::<&str>)],
            || {
                let config = BrokerConfig::from_env().unwrap();
                assert_eq!(config.url, "redis://127.0.0.1:6379");
            },
        );
    }
}
