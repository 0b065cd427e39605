//! MongoDB implementation of ActivityRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
};
use tracing::instrument;

use crate::error::ActivityResult;
use crate::models::{ActivityAction, ActivityEvent, ActivityPage, ActivityQuery, ActivityRecord};
use crate::repository::ActivityRepository;

/// MongoDB implementation of the audit store
pub struct MongoActivityRepository {
    collection: Collection<ActivityRecord>,
}

impl MongoActivityRepository {
    /// Create a new MongoActivityRepository on the `activity_log` collection
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("roster");
    /// let repo = MongoActivityRepository::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<ActivityRecord>("activity_log");
        Self { collection }
    }

    /// Create a new MongoActivityRepository with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<ActivityRecord>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<ActivityRecord> {
        &self.collection
    }

    /// Create the indexes the list operations rely on.
    ///
    /// Idempotent, call it once at worker startup. The key names are the
    /// serialized (camelCase) field names of [`ActivityRecord`].
    pub async fn create_indexes(&self) -> ActivityResult<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "timestamp": -1 }).build(),
            IndexModel::builder()
                .keys(doc! { "actorId": 1, "timestamp": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "action": 1, "timestamp": -1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;

        tracing::debug!("Activity log indexes ensured");
        Ok(())
    }

    async fn find_page(&self, filter: Document, query: &ActivityQuery) -> ActivityResult<ActivityPage> {
        use futures_util::TryStreamExt;

        // Count first so `total` covers the full matching set, not the page
        let total = self.collection.count_documents(filter.clone()).await?;

        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .skip(query.skip())
            .limit(query.limit)
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let records: Vec<ActivityRecord> = cursor.try_collect().await?;

        Ok(ActivityPage { records, total })
    }
}

#[async_trait]
impl ActivityRepository for MongoActivityRepository {
    #[instrument(skip(self, event), fields(actor_id = event.actor_id, action = %event.action))]
    async fn append(&self, event: ActivityEvent) -> ActivityResult<ActivityRecord> {
        let record = ActivityRecord::from_event(event);

        self.collection.insert_one(&record).await?;

        tracing::debug!(record_id = %record.id, "Audit record appended");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_all(&self, query: ActivityQuery) -> ActivityResult<ActivityPage> {
        self.find_page(doc! {}, &query).await
    }

    #[instrument(skip(self))]
    async fn list_by_actor(
        &self,
        actor_id: i64,
        query: ActivityQuery,
    ) -> ActivityResult<ActivityPage> {
        self.find_page(doc! { "actorId": actor_id }, &query).await
    }

    #[instrument(skip(self))]
    async fn list_by_action(
        &self,
        action: ActivityAction,
        query: ActivityQuery,
    ) -> ActivityResult<ActivityPage> {
        self.find_page(doc! { "action": action.to_string() }, &query).await
    }
}
