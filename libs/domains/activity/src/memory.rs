//! In-memory implementation of [`ActivityRepository`]
//!
//! Backs unit tests and local development without a MongoDB instance. The
//! semantics match the MongoDB implementation: append-only, store-assigned
//! ids and timestamps, pages sorted most recent first.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{ActivityError, ActivityResult};
use crate::models::{ActivityAction, ActivityEvent, ActivityPage, ActivityQuery, ActivityRecord};
use crate::repository::ActivityRepository;

#[derive(Default)]
pub struct InMemoryActivityRepository {
    // Insertion order is storage order, so reverse iteration gives the
    // most-recent-first ordering the list operations promise.
    records: RwLock<Vec<ActivityRecord>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn page(matching: Vec<ActivityRecord>, query: &ActivityQuery) -> ActivityPage {
        let total = matching.len() as u64;
        let records = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit.max(0) as usize)
            .collect();

        ActivityPage { records, total }
    }

    fn collect_matching<F>(&self, predicate: F) -> ActivityResult<Vec<ActivityRecord>>
    where
        F: Fn(&ActivityRecord) -> bool,
    {
        let records = self
            .records
            .read()
            .map_err(|_| ActivityError::Storage("audit store lock poisoned".to_string()))?;

        Ok(records.iter().rev().filter(|r| predicate(r)).cloned().collect())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn append(&self, event: ActivityEvent) -> ActivityResult<ActivityRecord> {
        let record = ActivityRecord::from_event(event);

        let mut records = self
            .records
            .write()
            .map_err(|_| ActivityError::Storage("audit store lock poisoned".to_string()))?;
        records.push(record.clone());

        Ok(record)
    }

    async fn list_all(&self, query: ActivityQuery) -> ActivityResult<ActivityPage> {
        let matching = self.collect_matching(|_| true)?;
        Ok(Self::page(matching, &query))
    }

    async fn list_by_actor(
        &self,
        actor_id: i64,
        query: ActivityQuery,
    ) -> ActivityResult<ActivityPage> {
        let matching = self.collect_matching(|r| r.actor_id == actor_id)?;
        Ok(Self::page(matching, &query))
    }

    async fn list_by_action(
        &self,
        action: ActivityAction,
        query: ActivityQuery,
    ) -> ActivityResult<ActivityPage> {
        let matching = self.collect_matching(|r| r.action == action)?;
        Ok(Self::page(matching, &query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityState;
    use serde_json::json;

    fn state(pairs: &[(&str, &str)]) -> EntityState {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[tokio::test]
    async fn append_assigns_storage_identity() {
        let repo = InMemoryActivityRepository::new();
        let event = ActivityEvent::login(1, "a@x.com", None);
        let occurred_at = event.occurred_at;

        let record = repo.append(event).await.unwrap();

        assert_eq!(record.occurred_at, occurred_at);
        assert!(record.timestamp >= occurred_at);
    }

    #[tokio::test]
    async fn duplicate_append_yields_two_records() {
        let repo = InMemoryActivityRepository::new();
        let event = ActivityEvent::login(1, "a@x.com", None);

        repo.append(event.clone()).await.unwrap();
        repo.append(event).await.unwrap();

        let page = repo.list_all(ActivityQuery::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records.len(), 2);
        assert_ne!(page.records[0].id, page.records[1].id);
    }

    #[tokio::test]
    async fn pagination_splits_25_records_into_pages_of_10() {
        let repo = InMemoryActivityRepository::new();
        for i in 0..25 {
            repo.append(ActivityEvent::login(i, format!("u{}@x.com", i), None))
                .await
                .unwrap();
        }

        let first = repo.list_all(ActivityQuery::new(1, 10)).await.unwrap();
        assert_eq!(first.records.len(), 10);
        assert_eq!(first.total, 25);

        let third = repo.list_all(ActivityQuery::new(3, 10)).await.unwrap();
        assert_eq!(third.records.len(), 5);
        assert_eq!(third.total, 25);
    }

    #[tokio::test]
    async fn list_returns_most_recent_first() {
        let repo = InMemoryActivityRepository::new();
        let after = state(&[("email", "a@x.com"), ("name", "A")]);

        repo.append(ActivityEvent::created(7, "a@x.com", Some("A".to_string()), after.clone()))
            .await
            .unwrap();
        repo.append(ActivityEvent::deleted(7, "a@x.com", Some("A".to_string()), after))
            .await
            .unwrap();

        let page = repo.list_by_actor(7, ActivityQuery::new(1, 50)).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.records[0].action, ActivityAction::Delete);
        assert_eq!(page.records[1].action, ActivityAction::Create);
    }

    #[tokio::test]
    async fn list_by_actor_excludes_other_actors() {
        let repo = InMemoryActivityRepository::new();
        repo.append(ActivityEvent::login(1, "a@x.com", None)).await.unwrap();
        repo.append(ActivityEvent::login(2, "b@x.com", None)).await.unwrap();
        repo.append(ActivityEvent::login(1, "a@x.com", None)).await.unwrap();

        let page = repo.list_by_actor(1, ActivityQuery::default()).await.unwrap();

        assert_eq!(page.total, 2);
        assert!(page.records.iter().all(|r| r.actor_id == 1));
    }

    #[tokio::test]
    async fn list_by_action_filters_and_counts_the_full_set() {
        let repo = InMemoryActivityRepository::new();
        for i in 0..3 {
            repo.append(ActivityEvent::login(i, "a@x.com", None)).await.unwrap();
        }
        repo.append(ActivityEvent::created(9, "c@x.com", None, state(&[("email", "c@x.com")])))
            .await
            .unwrap();

        let logins = repo
            .list_by_action(ActivityAction::Login, ActivityQuery::new(1, 2))
            .await
            .unwrap();

        assert_eq!(logins.total, 3);
        assert_eq!(logins.records.len(), 2);
        assert!(logins.records.iter().all(|r| r.action == ActivityAction::Login));
    }

    #[tokio::test]
    async fn list_does_not_mutate_the_store() {
        let repo = InMemoryActivityRepository::new();
        repo.append(ActivityEvent::login(1, "a@x.com", None)).await.unwrap();

        repo.list_all(ActivityQuery::default()).await.unwrap();
        repo.list_all(ActivityQuery::default()).await.unwrap();
        let page = repo.list_all(ActivityQuery::default()).await.unwrap();

        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn page_beyond_the_end_is_empty_but_total_is_full() {
        let repo = InMemoryActivityRepository::new();
        repo.append(ActivityEvent::login(1, "a@x.com", None)).await.unwrap();

        let page = repo.list_all(ActivityQuery::new(5, 10)).await.unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.total, 1);
    }
}
