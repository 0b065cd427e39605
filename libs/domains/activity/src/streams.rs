//! Stream definitions for the activity domain

use stream_broker::StreamDef;

/// The user activity stream.
///
/// Every audit event the API publishes flows through this single stream,
/// keyed by actor id so the broker keeps per-actor ordering. The worker
/// consumes it through one consumer group, which is what gives the pipeline
/// its at-least-once delivery.
pub struct ActivityStream;

impl StreamDef for ActivityStream {
    /// Stream the API publishes audit events to
    const STREAM_NAME: &'static str = "user-activity";

    /// Consumer group the activity worker reads through
    const CONSUMER_GROUP: &'static str = "activity-log-consumer-group";
}
