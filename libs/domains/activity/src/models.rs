use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Snapshot of an entity's fields before or after a change
pub type EntityState = Map<String, Value>;

/// What the actor did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
}

/// What kind of entity the action touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    User,
    Auth,
}

/// A single audit event, as published to the activity stream.
///
/// Wire format is camelCase JSON. `occurred_at` is assigned exactly once, by
/// the producer; the audit store adds its own id and storage timestamp when
/// the event is appended, it never rewrites this one.
///
/// The state fields follow the action:
/// - `CREATE` carries `after_state` only
/// - `UPDATE` carries both `before_state` and `after_state`
/// - `DELETE` carries `before_state` only
/// - `LOGIN` carries neither, and always targets `AUTH`
///
/// Use the [`ActivityEvent::created`], [`ActivityEvent::updated`],
/// [`ActivityEvent::deleted`] and [`ActivityEvent::login`] constructors; they
/// make an event with the wrong state combination impossible to build.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Producer-assigned event id. The store does not deduplicate on it; it
    /// exists so consumers can correlate redeliveries in logs.
    pub event_id: Uuid,
    /// The user the action concerns
    pub actor_id: i64,
    pub actor_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    pub action: ActivityAction,
    pub entity_kind: EntityKind,
    /// Domain id of the touched entity, set for USER events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub before_state: Option<EntityState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub after_state: Option<EntityState>,
    /// Client IP, best effort
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    /// Client user agent, best effort
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_agent: Option<String>,
    /// When the action happened, producer clock
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    fn new(
        actor_id: i64,
        actor_email: String,
        actor_name: Option<String>,
        action: ActivityAction,
        entity_kind: EntityKind,
        entity_id: Option<i64>,
        before_state: Option<EntityState>,
        after_state: Option<EntityState>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            actor_id,
            actor_email,
            actor_name,
            action,
            entity_kind,
            entity_id,
            before_state,
            after_state,
            client_address: None,
            client_agent: None,
            occurred_at: Utc::now(),
        }
    }

    /// A user entity was created; `after` is its initial state
    pub fn created(
        actor_id: i64,
        actor_email: impl Into<String>,
        actor_name: Option<String>,
        after: EntityState,
    ) -> Self {
        Self::new(
            actor_id,
            actor_email.into(),
            actor_name,
            ActivityAction::Create,
            EntityKind::User,
            Some(actor_id),
            None,
            Some(after),
        )
    }

    /// A user entity changed from `before` to `after`
    pub fn updated(
        actor_id: i64,
        actor_email: impl Into<String>,
        actor_name: Option<String>,
        before: EntityState,
        after: EntityState,
    ) -> Self {
        Self::new(
            actor_id,
            actor_email.into(),
            actor_name,
            ActivityAction::Update,
            EntityKind::User,
            Some(actor_id),
            Some(before),
            Some(after),
        )
    }

    /// A user entity was deleted; `before` is its last state
    pub fn deleted(
        actor_id: i64,
        actor_email: impl Into<String>,
        actor_name: Option<String>,
        before: EntityState,
    ) -> Self {
        Self::new(
            actor_id,
            actor_email.into(),
            actor_name,
            ActivityAction::Delete,
            EntityKind::User,
            Some(actor_id),
            Some(before),
            None,
        )
    }

    /// The actor authenticated. Always `AUTH`, never carries state snapshots.
    pub fn login(actor_id: i64, actor_email: impl Into<String>, actor_name: Option<String>) -> Self {
        Self::new(
            actor_id,
            actor_email.into(),
            actor_name,
            ActivityAction::Login,
            EntityKind::Auth,
            None,
            None,
            None,
        )
    }

    /// Attach request client info. Both fields are optional and omitted from
    /// the wire format when absent.
    pub fn with_client(mut self, address: Option<String>, agent: Option<String>) -> Self {
        self.client_address = address;
        self.client_agent = agent;
        self
    }
}

/// A persisted audit record: one event plus the store-assigned identity.
///
/// `timestamp` is when the store appended the record and is deliberately
/// distinct from the producer's `occurred_at`. All list operations sort on
/// `timestamp`, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Store-assigned identifier (stored as `_id` in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// When the store appended the record
    pub timestamp: DateTime<Utc>,
    pub event_id: Uuid,
    pub actor_id: i64,
    pub actor_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    pub action: ActivityAction,
    pub entity_kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub before_state: Option<EntityState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub after_state: Option<EntityState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_agent: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Turn an event into a record, assigning the store id and storage
    /// timestamp. No deduplication: the same event appended twice produces
    /// two records with distinct ids.
    pub fn from_event(event: ActivityEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_id: event.event_id,
            actor_id: event.actor_id,
            actor_email: event.actor_email,
            actor_name: event.actor_name,
            action: event.action,
            entity_kind: event.entity_kind,
            entity_id: event.entity_id,
            before_state: event.before_state,
            after_state: event.after_state,
            client_address: event.client_address,
            client_agent: event.client_agent,
            occurred_at: event.occurred_at,
        }
    }
}

/// Pagination parameters for the audit query endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Records per page
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> i64 {
    50
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

impl ActivityQuery {
    pub fn new(page: u64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Records to skip: `(page - 1) * limit`, saturating at page 1
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit.max(0) as u64
    }
}

/// One page of audit records plus the total size of the full matching set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityPage {
    pub records: Vec<ActivityRecord>,
    /// Count of every matching record, not just this page
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(pairs: &[(&str, &str)]) -> EntityState {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn login_targets_auth_and_carries_no_state() {
        let event = ActivityEvent::login(7, "a@x.com", None);

        assert_eq!(event.action, ActivityAction::Login);
        assert_eq!(event.entity_kind, EntityKind::Auth);
        assert!(event.entity_id.is_none());
        assert!(event.before_state.is_none());
        assert!(event.after_state.is_none());
    }

    #[test]
    fn created_carries_after_state_only() {
        let event = ActivityEvent::created(1, "a@x.com", None, state(&[("email", "a@x.com")]));

        assert_eq!(event.action, ActivityAction::Create);
        assert_eq!(event.entity_kind, EntityKind::User);
        assert_eq!(event.entity_id, Some(1));
        assert!(event.before_state.is_none());
        assert!(event.after_state.is_some());
    }

    #[test]
    fn deleted_carries_before_state_only() {
        let event = ActivityEvent::deleted(1, "a@x.com", None, state(&[("email", "a@x.com")]));

        assert_eq!(event.action, ActivityAction::Delete);
        assert!(event.before_state.is_some());
        assert!(event.after_state.is_none());
    }

    #[test]
    fn updated_never_swaps_before_and_after() {
        let event = ActivityEvent::updated(
            1,
            "a@x.com",
            None,
            state(&[("name", "A")]),
            state(&[("name", "B")]),
        );

        assert_eq!(event.before_state.as_ref().and_then(|s| s.get("name")), Some(&json!("A")));
        assert_eq!(event.after_state.as_ref().and_then(|s| s.get("name")), Some(&json!("B")));
    }

    #[test]
    fn event_serializes_as_camel_case() {
        let event = ActivityEvent::created(7, "a@x.com", Some("Ana".to_string()), state(&[("name", "Ana")]))
            .with_client(Some("10.0.0.1".to_string()), Some("curl/8".to_string()));

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["actorId"], json!(7));
        assert_eq!(value["actorEmail"], json!("a@x.com"));
        assert_eq!(value["action"], json!("CREATE"));
        assert_eq!(value["entityKind"], json!("USER"));
        assert_eq!(value["entityId"], json!(7));
        assert_eq!(value["clientAddress"], json!("10.0.0.1"));
        assert!(value.get("beforeState").is_none());
        assert!(value.get("occurredAt").is_some());
    }

    #[test]
    fn absent_optionals_are_omitted_from_the_wire() {
        let value = serde_json::to_value(ActivityEvent::login(1, "a@x.com", None)).unwrap();

        assert!(value.get("actorName").is_none());
        assert!(value.get("entityId").is_none());
        assert!(value.get("clientAddress").is_none());
        assert!(value.get("clientAgent").is_none());
    }

    #[test]
    fn event_round_trips_through_json() {
        let event = ActivityEvent::updated(
            3,
            "b@x.com",
            Some("Bo".to_string()),
            state(&[("name", "A")]),
            state(&[("name", "B")]),
        );

        let json = serde_json::to_string(&event).unwrap();
        let parsed: ActivityEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.event_id, event.event_id);
        assert_eq!(parsed.actor_id, 3);
        assert_eq!(parsed.occurred_at, event.occurred_at);
        assert_eq!(parsed.before_state, event.before_state);
        assert_eq!(parsed.after_state, event.after_state);
    }

    #[test]
    fn action_parses_from_screaming_snake_case() {
        assert_eq!("CREATE".parse::<ActivityAction>().unwrap(), ActivityAction::Create);
        assert_eq!("LOGIN".parse::<ActivityAction>().unwrap(), ActivityAction::Login);
        assert!("create".parse::<ActivityAction>().is_err());
        assert_eq!(ActivityAction::Delete.to_string(), "DELETE");
    }

    #[test]
    fn record_keeps_occurred_at_and_adds_storage_identity() {
        let event = ActivityEvent::login(7, "a@x.com", None);
        let occurred_at = event.occurred_at;

        let record = ActivityRecord::from_event(event);

        assert_eq!(record.occurred_at, occurred_at);
        assert!(record.timestamp >= occurred_at);
    }

    #[test]
    fn duplicate_events_get_distinct_record_ids() {
        let event = ActivityEvent::login(7, "a@x.com", None);

        let first = ActivityRecord::from_event(event.clone());
        let second = ActivityRecord::from_event(event);

        assert_ne!(first.id, second.id);
        assert_eq!(first.event_id, second.event_id);
    }

    #[test]
    fn query_defaults_apply_when_params_are_absent() {
        let query: ActivityQuery = serde_json::from_str("{}").unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn skip_is_pages_before_the_requested_one() {
        assert_eq!(ActivityQuery::new(1, 10).skip(), 0);
        assert_eq!(ActivityQuery::new(3, 10).skip(), 20);
        assert_eq!(ActivityQuery::new(0, 10).skip(), 0);
    }
}
