use async_trait::async_trait;

use crate::error::ActivityResult;
use crate::models::{ActivityAction, ActivityEvent, ActivityPage, ActivityQuery, ActivityRecord};

/// Data access for the append-only audit store.
///
/// The store assigns each record its id and storage timestamp on append.
/// List operations never mutate anything, sort by storage timestamp with the
/// most recent record first, and report the total size of the full matching
/// set alongside the requested page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Append one event as a new record.
    ///
    /// No deduplication happens here: appending the same event twice yields
    /// two records with distinct ids.
    async fn append(&self, event: ActivityEvent) -> ActivityResult<ActivityRecord>;

    /// One page of all records
    async fn list_all(&self, query: ActivityQuery) -> ActivityResult<ActivityPage>;

    /// One page of the records for a single actor
    async fn list_by_actor(
        &self,
        actor_id: i64,
        query: ActivityQuery,
    ) -> ActivityResult<ActivityPage>;

    /// One page of the records for a single action
    async fn list_by_action(
        &self,
        action: ActivityAction,
        query: ActivityQuery,
    ) -> ActivityResult<ActivityPage>;
}
