//! Core processor trait and the generic StreamWorker implementation.
//!
//! The worker reads deliveries one at a time, parses them, runs the
//! processor, and acknowledges based on the error category:
//!
//! - success: acknowledge
//! - permanent error (unparseable payload): acknowledge and drop
//! - transient error (handler/storage failure): leave pending so the
//!   broker redelivers it

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::client::BrokerClient;
use crate::config::WorkerConfig;
use crate::consumer::StreamConsumer;
use crate::delivery::Delivery;
use crate::error::{BrokerError, ErrorCategory};

/// Trait for message processors.
///
/// Domain handlers implement this trait to process messages from a stream.
///
/// # Example
///
/// ```rust,ignore
/// use stream_broker::{StreamProcessor, BrokerError};
///
/// struct ActivityProcessor {
///     repository: Arc<dyn ActivityRepository>,
/// }
///
/// #[async_trait]
/// impl StreamProcessor for ActivityProcessor {
///     type Message = ActivityEvent;
///
///     async fn process(&self, event: ActivityEvent) -> Result<(), BrokerError> {
///         self.repository.append(event.into()).await
///             .map_err(|e| BrokerError::handler(e.to_string()))
///     }
///
///     fn name(&self) -> &'static str {
///         "ActivityProcessor"
///     }
/// }
/// ```
#[async_trait]
pub trait StreamProcessor: Send + Sync {
    /// The message type this processor consumes.
    type Message: DeserializeOwned + Send;

    /// Process a single message.
    ///
    /// Return `Ok(())` for success. Return a transient error (for example
    /// [`BrokerError::handler`]) when the message should be redelivered.
    async fn process(&self, message: Self::Message) -> Result<(), BrokerError>;

    /// Get the processor name for logging.
    fn name(&self) -> &'static str;
}

/// Generic stream worker that feeds deliveries to a processor.
///
/// This struct encapsulates the worker loop with:
/// - Consumer group management
/// - Pending message recovery on startup
/// - Periodic claim of messages abandoned by dead consumers
/// - Graceful shutdown (the in-flight message finishes, then the loop stops)
///
/// Messages are processed strictly one at a time, preserving stream order.
pub struct StreamWorker<P: StreamProcessor> {
    consumer: StreamConsumer,
    processor: Arc<P>,
    config: WorkerConfig,
}

impl<P: StreamProcessor + 'static> StreamWorker<P> {
    /// Create a new stream worker.
    pub fn new(client: BrokerClient, processor: P, config: WorkerConfig) -> Self {
        let consumer = StreamConsumer::new(client, config.clone());

        Self {
            consumer,
            processor: Arc::new(processor),
            config,
        }
    }

    /// Get a reference to the consumer for health checks.
    pub fn consumer(&self) -> &StreamConsumer {
        &self.consumer
    }

    /// Run the worker loop.
    ///
    /// This continuously reads messages from the stream and processes them.
    /// Use the shutdown receiver to gracefully stop the worker.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<(), BrokerError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            "Starting stream worker"
        );

        // Ensure consumer group exists
        self.consumer.init_consumer_group().await?;

        // On startup, drain messages delivered to this consumer before a crash
        match self.consumer.read_pending().await {
            Ok(deliveries) if !deliveries.is_empty() => {
                info!(count = deliveries.len(), "Recovering pending messages");
                self.dispatch_batch(deliveries, &shutdown).await;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read pending messages on startup"),
        }

        let claim_interval = Duration::from_secs(self.config.claim_interval_secs);
        let mut last_claim = std::time::Instant::now();

        // Track consecutive errors for exponential backoff
        let mut consecutive_errors: u32 = 0;
        const MAX_BACKOFF_SECS: u64 = 30;

        info!(
            block_timeout_ms = %self.config.block_timeout_ms,
            claim_interval_secs = %self.config.claim_interval_secs,
            batch_size = %self.config.batch_size,
            "Worker running in blocking mode"
        );

        loop {
            // Check for shutdown signal
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping worker");
                break;
            }

            // Read and process new messages
            match self.consumer.read_new().await {
                Ok(deliveries) => {
                    if consecutive_errors > 0 {
                        info!("Connection recovered after {} errors", consecutive_errors);
                        consecutive_errors = 0;
                    }
                    self.dispatch_batch(deliveries, &shutdown).await;
                }
                Err(e) => {
                    consecutive_errors += 1;

                    if e.is_nogroup() {
                        warn!("Consumer group missing, recreating...");
                        if let Err(create_err) = self.consumer.init_consumer_group().await {
                            error!(error = %create_err, "Failed to recreate consumer group");
                        }
                    } else if e.is_connection_error() {
                        let backoff_secs =
                            std::cmp::min(2u64.pow(consecutive_errors.min(5)), MAX_BACKOFF_SECS);
                        warn!(
                            error = %e,
                            consecutive_errors = %consecutive_errors,
                            backoff_secs = %backoff_secs,
                            "Broker connection error, backing off"
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    } else {
                        error!(error = %e, "Error reading from stream");
                    }

                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            }

            // Periodically claim messages abandoned by dead consumers
            if last_claim.elapsed() >= claim_interval {
                match self.consumer.claim_abandoned().await {
                    Ok(deliveries) => self.dispatch_batch(deliveries, &shutdown).await,
                    Err(e) => debug!(error = %e, "Error claiming abandoned messages"),
                }
                last_claim = std::time::Instant::now();
            }
        }

        info!("Stream worker stopped");
        Ok(())
    }

    /// Process deliveries sequentially, honoring shutdown between messages.
    ///
    /// A message being processed when shutdown arrives is finished and
    /// acknowledged; the rest of the batch stays pending and is recovered
    /// on the next start.
    async fn dispatch_batch(&self, deliveries: Vec<Delivery>, shutdown: &watch::Receiver<bool>) {
        for delivery in deliveries {
            self.dispatch(delivery).await;

            if *shutdown.borrow() {
                break;
            }
        }
    }

    /// Process a single delivery and settle it with the broker.
    pub async fn dispatch(&self, delivery: Delivery) {
        debug!(
            stream_id = %delivery.stream_id,
            key = ?delivery.key,
            lag_ms = %delivery.age_ms(),
            "Processing message"
        );

        let result = match delivery.parse::<P::Message>() {
            Ok(message) => self.processor.process(message).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if let Err(e) = self.consumer.ack(&delivery.stream_id).await {
                    error!(
                        stream_id = %delivery.stream_id,
                        error = %e,
                        "Failed to acknowledge processed message"
                    );
                }
            }
            Err(e) if e.category() == ErrorCategory::Permanent => {
                // Redelivery can never succeed; acknowledge so the entry is
                // dropped instead of poisoning the pending list
                warn!(
                    stream_id = %delivery.stream_id,
                    error = %e,
                    "Skipping message permanently"
                );
                if let Err(ack_err) = self.consumer.ack(&delivery.stream_id).await {
                    error!(
                        stream_id = %delivery.stream_id,
                        error = %ack_err,
                        "Failed to acknowledge skipped message"
                    );
                }
            }
            Err(e) => {
                // Leave unacknowledged; the claim sweep redelivers it
                warn!(
                    stream_id = %delivery.stream_id,
                    error = %e,
                    "Processing failed, leaving message pending for redelivery"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Deserialize)]
    struct TestMessage {
        #[allow(dead_code)]
        id: u32,
    }

    #[derive(Default)]
    struct CountingProcessor {
        processed: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl StreamProcessor for CountingProcessor {
        type Message = TestMessage;

        async fn process(&self, _message: TestMessage) -> Result<(), BrokerError> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(BrokerError::handler("simulated failure"))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &'static str {
            "CountingProcessor"
        }
    }

    fn worker(processor: CountingProcessor) -> StreamWorker<CountingProcessor> {
        StreamWorker::new(
            BrokerClient::new(BrokerConfig::default()),
            processor,
            WorkerConfig::new("test-stream", "test-group"),
        )
    }

    fn delivery(payload: &str) -> Delivery {
        Delivery::from_fields(
            "1234567890123-0".to_string(),
            vec![("payload".to_string(), payload.to_string())],
        )
    }

    #[tokio::test]
    async fn test_dispatch_processes_wellformed_message() {
        let worker = worker(CountingProcessor::default());

        worker.dispatch(delivery(r#"{"id":1}"#)).await;

        assert_eq!(worker.processor.processed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_never_invokes_processor_for_malformed_payload() {
        let worker = worker(CountingProcessor::default());

        worker.dispatch(delivery("{not json")).await;

        assert_eq!(worker.processor.processed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_survives_handler_failure() {
        let worker = worker(CountingProcessor {
            processed: AtomicU32::new(0),
            fail: true,
        });

        // Must not panic; the message is left for redelivery
        worker.dispatch(delivery(r#"{"id":1}"#)).await;
        worker.dispatch(delivery(r#"{"id":2}"#)).await;

        assert_eq!(worker.processor.processed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_requires_connection() {
        let worker = worker(CountingProcessor::default());
        let (_tx, rx) = watch::channel(false);

        // Without a broker connection the group cannot be initialized
        let result = worker.run(rx).await;
        assert!(result.is_err());
    }
}
