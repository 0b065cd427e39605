//! Consumer side of the activity pipeline
//!
//! `ActivityProcessor` implements `StreamProcessor` for `ActivityEvent`: it
//! appends every consumed event to the audit store. The worker around it owns
//! the delivery policy, so the split of outcomes is:
//!
//! - append succeeded: the worker acknowledges the entry
//! - payload did not parse: the worker logs and acknowledges, the entry is
//!   dropped permanently and later events keep flowing
//! - append failed: this processor returns a transient handler error, the
//!   entry stays pending and is redelivered (at-least-once)

use std::sync::Arc;

use async_trait::async_trait;
use stream_broker::{BrokerError, StreamProcessor};
use tracing::{debug, error};

use crate::models::ActivityEvent;
use crate::repository::ActivityRepository;

/// Persists consumed activity events into the audit store
pub struct ActivityProcessor<R: ActivityRepository> {
    repository: Arc<R>,
}

impl<R: ActivityRepository> ActivityProcessor<R> {
    /// Create a new processor over a shared audit store
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: ActivityRepository + 'static> StreamProcessor for ActivityProcessor<R> {
    type Message = ActivityEvent;

    async fn process(&self, event: ActivityEvent) -> Result<(), BrokerError> {
        debug!(
            event_id = %event.event_id,
            actor_id = event.actor_id,
            action = %event.action,
            "Processing activity event"
        );

        let record = self.repository.append(event).await.map_err(|e| {
            error!(error = %e, "Failed to append audit record");
            BrokerError::handler(e.to_string())
        })?;

        debug!(record_id = %record.id, "Audit record stored");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ActivityProcessor"
    }
}

impl<R: ActivityRepository> Clone for ActivityProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
