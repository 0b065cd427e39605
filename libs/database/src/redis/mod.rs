//! Redis database connector and utilities
//!
//! Provides connection management and health checking. Broker-level
//! configuration and retry policy live in the `stream-broker` crate,
//! which builds on these primitives.

mod connector;
mod health;

pub use connector::connect;
pub use health::check_health;

// Re-export redis types for convenience
pub use redis::RedisResult;
pub use redis::aio::ConnectionManager;
