//! Stream definitions.
//!
//! Each domain implements `StreamDef` to pin its stream name, consumer group,
//! and trim length in one place shared by producer and worker.

/// Stream definition trait.
///
/// # Example
///
/// ```rust,ignore
/// use stream_broker::StreamDef;
///
/// pub struct ActivityStream;
///
/// impl StreamDef for ActivityStream {
///     const STREAM_NAME: &'static str = "user-activity";
///     const CONSUMER_GROUP: &'static str = "activity-log-consumer-group";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    /// The Redis stream name (doubles as the topic name).
    const STREAM_NAME: &'static str;

    /// The consumer group name for this stream.
    const CONSUMER_GROUP: &'static str;

    /// Maximum stream length before auto-trim (MAXLEN ~).
    /// Default: 100,000 entries.
    const MAX_LENGTH: i64 = 100_000;

    /// Get the stream name.
    fn stream_name() -> &'static str {
        Self::STREAM_NAME
    }

    /// Get the consumer group name.
    fn consumer_group() -> &'static str {
        Self::CONSUMER_GROUP
    }
}
