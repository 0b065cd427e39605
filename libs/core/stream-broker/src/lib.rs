//! Stream Broker
//!
//! A Redis Streams message broker layer: a connection-owning client, a keyed
//! producer, and a consumer-group worker for processing published messages.
//!
//! ## Features
//!
//! - **Explicit connection state**: `BrokerClient` owns the connection;
//!   producers and workers hold clones and observe it, never mutate it
//! - **Degraded startup**: a service can come up without the broker and keep
//!   serving; sends are skipped while disconnected
//! - **Consumer groups**: new groups subscribe from the stream end, pending
//!   entries are recovered on restart and claimed from dead consumers
//! - **At-least-once**: messages are acknowledged only after the processor
//!   succeeds (or is never going to succeed)
//!
//! ## Example
//!
//! ```ignore
//! use stream_broker::{
//!     BrokerClient, BrokerConfig, StreamDef, StreamProcessor, StreamWorker, WorkerConfig,
//! };
//!
//! // Define your stream
//! struct MyStream;
//! impl StreamDef for MyStream {
//!     const STREAM_NAME: &'static str = "my-stream";
//!     const CONSUMER_GROUP: &'static str = "my-consumer-group";
//! }
//!
//! // Connect and run
//! let client = BrokerClient::new(BrokerConfig::new("redis://127.0.0.1:6379"));
//! client.connect().await?;
//!
//! let config = WorkerConfig::from_stream_def::<MyStream>();
//! let worker = StreamWorker::new(client, processor, config);
//! worker.run(shutdown_rx).await?;
//! ```

mod client;
mod config;
mod consumer;
mod delivery;
mod error;
mod producer;
mod registry;
mod worker;

// Re-export main types
pub use client::BrokerClient;
pub use config::{BrokerConfig, WorkerConfig};
pub use consumer::StreamConsumer;
pub use delivery::Delivery;
pub use error::{BrokerError, ErrorCategory};
pub use producer::StreamProducer;
pub use registry::StreamDef;
pub use worker::{StreamProcessor, StreamWorker};
