//! Activity Domain
//!
//! The asynchronous audit trail of the roster service. The API publishes one
//! event per user-facing action; a stream worker consumes them and appends
//! them to an append-only MongoDB store, which the worker also exposes for
//! querying.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Publisher  │ ──▶ │ user-activity │ ──▶ │  Processor  │
//! │  (API side) │     │ Redis stream  │     │ (worker)    │
//! └─────────────┘     └──────────────┘     └──────┬──────┘
//!                                                  │ append
//!                     ┌─────────────┐       ┌──────▼──────┐
//!                     │  Handlers   │ ◀──── │ Repository  │
//!                     │ (query API) │ list  │  (MongoDB)  │
//!                     └─────────────┘       └─────────────┘
//! ```
//!
//! Delivery is at least once: the consumer group redelivers entries whose
//! append failed, and the store does not deduplicate. Publishing is fire and
//! forget; a dead broker degrades the audit trail, never the request path.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_activity::{
//!     ActivityEvent, ActivityProcessor, ActivityPublisher, ActivityStream,
//!     mongodb::MongoActivityRepository,
//! };
//! use std::sync::Arc;
//! use stream_broker::{BrokerClient, BrokerConfig, StreamWorker, WorkerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // API side: publish events through a shared broker client
//! let client = BrokerClient::new(BrokerConfig::new("redis://localhost:6379"));
//! client.connect_or_degraded().await;
//! let publisher = ActivityPublisher::new(client.clone());
//! publisher.publish(ActivityEvent::login(1, "a@x.com", None)).await;
//!
//! // Worker side: consume the stream into the audit store
//! let mongo = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = Arc::new(MongoActivityRepository::new(mongo.database("roster")));
//! repository.create_indexes().await?;
//!
//! let worker = StreamWorker::new(
//!     client,
//!     ActivityProcessor::new(repository),
//!     WorkerConfig::from_stream_def::<ActivityStream>(),
//! );
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! worker.run(shutdown_rx).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod processor;
pub mod publisher;
pub mod repository;
pub mod streams;

pub use error::{ActivityError, ActivityResult};
pub use memory::InMemoryActivityRepository;
pub use models::{
    ActivityAction, ActivityEvent, ActivityPage, ActivityQuery, ActivityRecord, EntityKind,
    EntityState,
};
pub use mongodb::MongoActivityRepository;
pub use processor::ActivityProcessor;
pub use publisher::ActivityPublisher;
pub use repository::ActivityRepository;
pub use streams::ActivityStream;
