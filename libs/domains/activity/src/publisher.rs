//! Producer side of the activity pipeline

use stream_broker::{BrokerClient, StreamProducer};
use tracing::{debug, warn};

use crate::models::ActivityEvent;
use crate::streams::ActivityStream;

/// Publishes audit events to the user activity stream.
///
/// Audit logging is a side effect of the domain operation, never part of its
/// contract, so [`publish`](ActivityPublisher::publish) is infallible from
/// the caller's point of view. A disconnected broker or a failed send is
/// logged and the event is dropped; there is no client-side buffering and no
/// retry. The request that produced the event completes normally either way.
///
/// Events are keyed by actor id, which keeps the broker's ordering guarantee
/// scoped per actor. Events of different actors may interleave.
#[derive(Clone)]
pub struct ActivityPublisher {
    producer: StreamProducer,
}

impl ActivityPublisher {
    pub fn new(client: BrokerClient) -> Self {
        Self {
            producer: StreamProducer::from_stream_def::<ActivityStream>(client),
        }
    }

    /// Whether the underlying broker connection is currently up
    pub fn is_connected(&self) -> bool {
        self.producer.is_connected()
    }

    /// Publish one event. Logs and swallows every failure.
    pub async fn publish(&self, event: ActivityEvent) {
        if !self.producer.is_connected() {
            warn!(
                actor_id = event.actor_id,
                action = %event.action,
                "Broker disconnected, skipping activity event"
            );
            return;
        }

        let key = event.actor_id.to_string();
        match self.producer.send(&key, &event).await {
            Ok(stream_id) => {
                debug!(
                    actor_id = event.actor_id,
                    action = %event.action,
                    stream_id = %stream_id,
                    "Activity event published"
                );
            }
            Err(e) => {
                warn!(
                    actor_id = event.actor_id,
                    action = %event.action,
                    error = %e,
                    "Failed to publish activity event, dropping it"
                );
            }
        }
    }
}
