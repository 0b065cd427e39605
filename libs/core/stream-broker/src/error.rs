//! Broker error types and error categorization
//!
//! Errors are categorized to determine what the worker does with the message
//! that produced them:
//! - **Transient**: leave the message unacknowledged so the broker redelivers it
//! - **Permanent**: acknowledge and drop, redelivery can never succeed

use thiserror::Error;

/// Category of error for determining redelivery behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Temporary failure - the message stays pending and is redelivered
    Transient,
    /// Unrecoverable error - the message is acknowledged and skipped
    Permanent,
}

/// Broker transport and processing errors
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The client has no live broker connection
    #[error("Broker not connected")]
    NotConnected,

    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Datastore connector error (health checks)
    #[error("Datastore error: {0}")]
    Datastore(#[from] database::DatabaseError),

    /// Message payload could not be serialized or parsed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Message handler failed
    #[error("Handler error: {0}")]
    Handler(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BrokerError {
    /// Create a handler error (transient; the message will be redelivered)
    pub fn handler(message: impl Into<String>) -> Self {
        BrokerError::Handler(message.into())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            BrokerError::NotConnected => ErrorCategory::Transient,
            BrokerError::Redis(_) => ErrorCategory::Transient,
            BrokerError::Datastore(_) => ErrorCategory::Transient,
            BrokerError::Serialization(_) => ErrorCategory::Permanent,
            BrokerError::Handler(_) => ErrorCategory::Transient,
            BrokerError::Config(_) => ErrorCategory::Permanent,
        }
    }

    /// Whether this is a "consumer group does not exist" error
    pub fn is_nogroup(&self) -> bool {
        matches!(self, BrokerError::Redis(e) if e.to_string().contains("NOGROUP"))
    }

    /// Whether this error indicates a lost or refused connection
    pub fn is_connection_error(&self) -> bool {
        match self {
            BrokerError::NotConnected => true,
            BrokerError::Redis(e) => {
                e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
            }
            BrokerError::Datastore(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::Serialization(err.to_string())
    }
}
