//! Broker client with explicit connection state
//!
//! The client owns the connection lifecycle. Producers and workers hold
//! clones of the client and read its state; only `connect` / `disconnect`
//! mutate it. There is no process-global connection flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use redis::aio::ConnectionManager;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::BrokerConfig;
use crate::error::BrokerError;

/// Connection state shared between the client and its clones.
struct ClientState {
    connection: RwLock<Option<ConnectionManager>>,
    connected: AtomicBool,
}

/// Broker connection handle.
///
/// Cheap to clone; all clones share one connection state. A clone held by a
/// producer observes `disconnect` on the original immediately.
#[derive(Clone)]
pub struct BrokerClient {
    config: BrokerConfig,
    state: Arc<ClientState>,
}

impl BrokerClient {
    /// Create a disconnected client. Call [`connect`](Self::connect) to bring
    /// the connection up.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            state: Arc::new(ClientState {
                connection: RwLock::new(None),
                connected: AtomicBool::new(false),
            }),
        }
    }

    /// Connect to the broker with a bounded retry budget and fixed backoff.
    ///
    /// Attempts `connect_attempts` times, sleeping `connect_backoff_ms`
    /// between attempts. On success the shared state flips to connected; on
    /// exhaustion the last transport error is returned and the client stays
    /// disconnected.
    pub async fn connect(&self) -> Result<(), BrokerError> {
        let attempts = self.config.connect_attempts.max(1);
        let backoff = Duration::from_millis(self.config.connect_backoff_ms);
        let mut last_error: Option<redis::RedisError> = None;

        for attempt in 1..=attempts {
            match database::redis::connect(&self.config.url).await {
                Ok(manager) => {
                    *self.state.connection.write().await = Some(manager);
                    self.state.connected.store(true, Ordering::SeqCst);
                    info!(url = %self.config.url, attempt, "Broker connected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Broker connection attempt failed"
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        Err(last_error
            .map(BrokerError::Redis)
            .unwrap_or(BrokerError::NotConnected))
    }

    /// Connect, but swallow failure: the service keeps running without the
    /// broker and sends are skipped until a later `connect` succeeds.
    pub async fn connect_or_degraded(&self) {
        if let Err(e) = self.connect().await {
            warn!(
                error = %e,
                "Broker unreachable at startup; continuing in degraded mode (messages will be skipped)"
            );
        }
    }

    /// Drop the connection. Idempotent; safe to call when never connected.
    pub async fn disconnect(&self) {
        self.state.connected.store(false, Ordering::SeqCst);
        let mut guard = self.state.connection.write().await;
        if guard.take().is_some() {
            info!("Broker disconnected");
        }
    }

    /// Whether the client currently holds a connection.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// Get a connection handle, or `NotConnected` if there is none.
    pub async fn connection(&self) -> Result<ConnectionManager, BrokerError> {
        if !self.is_connected() {
            return Err(BrokerError::NotConnected);
        }

        let guard = self.state.connection.read().await;
        guard.clone().ok_or(BrokerError::NotConnected)
    }

    /// Round-trip a PING over the current connection.
    pub async fn ping(&self) -> Result<(), BrokerError> {
        let mut conn = self.connection().await?;
        database::redis::check_health(&mut conn).await?;
        Ok(())
    }

    /// The URL this client connects to.
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_client_is_disconnected() {
        let client = BrokerClient::new(BrokerConfig::default());
        assert!(!client.is_connected());

        let conn = client.connection().await;
        assert!(matches!(conn, Err(BrokerError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        let client = BrokerClient::new(BrokerConfig::default());
        client.disconnect().await;
        client.disconnect().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_connect_exhausts_retry_budget() {
        // Port 1 refuses connections; two attempts with a tiny backoff
        let config = BrokerConfig::new("redis://127.0.0.1:1")
            .with_connect_attempts(2)
            .with_connect_backoff_ms(10);
        let client = BrokerClient::new(config);

        let result = client.connect().await;
        assert!(result.is_err());
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_connect_or_degraded_swallows_failure() {
        let config = BrokerConfig::new("redis://127.0.0.1:1")
            .with_connect_attempts(1)
            .with_connect_backoff_ms(10);
        let client = BrokerClient::new(config);

        // Must not panic or return an error
        client.connect_or_degraded().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let client = BrokerClient::new(BrokerConfig::default());
        let clone = client.clone();

        assert!(!clone.is_connected());
        client.disconnect().await;
        assert!(!clone.is_connected());
    }
}
