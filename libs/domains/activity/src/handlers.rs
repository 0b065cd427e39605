use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_helpers::errors::responses::InternalServerErrorResponse;
use std::sync::Arc;
use tracing::instrument;
use utoipa::OpenApi;

use crate::error::{ActivityError, ActivityResult};
use crate::models::{
    ActivityAction, ActivityPage, ActivityQuery, ActivityRecord, EntityKind,
};
use crate::repository::ActivityRepository;

/// OpenAPI documentation for the Activity API
#[derive(OpenApi)]
#[openapi(
    paths(list_activity, list_activity_by_actor, list_activity_by_action),
    components(
        schemas(ActivityRecord, ActivityPage, ActivityQuery, ActivityAction, EntityKind),
        responses(InternalServerErrorResponse)
    ),
    tags(
        (name = "Activity", description = "Audit log query endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the activity router with the audit query endpoints.
///
/// The endpoints are read only; records enter the store through the stream
/// worker, never through HTTP.
pub fn router<R: ActivityRepository + 'static>(repository: Arc<R>) -> Router {
    Router::new()
        .route("/", get(list_activity))
        .route("/actor/{actor_id}", get(list_activity_by_actor))
        .route("/action/{action}", get(list_activity_by_action))
        .with_state(repository)
}

/// List all audit records, most recent first
#[utoipa::path(
    get,
    path = "",
    tag = "Activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "One page of audit records", body = ActivityPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip(repository))]
async fn list_activity<R: ActivityRepository>(
    State(repository): State<Arc<R>>,
    Query(query): Query<ActivityQuery>,
) -> ActivityResult<Json<ActivityPage>> {
    let page = repository.list_all(query).await?;
    Ok(Json(page))
}

/// List the audit records of one actor, most recent first
#[utoipa::path(
    get,
    path = "/actor/{actor_id}",
    tag = "Activity",
    params(
        ("actor_id" = i64, Path, description = "Actor (user) ID"),
        ActivityQuery
    ),
    responses(
        (status = 200, description = "One page of the actor's audit records", body = ActivityPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip(repository))]
async fn list_activity_by_actor<R: ActivityRepository>(
    State(repository): State<Arc<R>>,
    Path(actor_id): Path<i64>,
    Query(query): Query<ActivityQuery>,
) -> ActivityResult<Json<ActivityPage>> {
    let page = repository.list_by_actor(actor_id, query).await?;
    Ok(Json(page))
}

/// List the audit records of one action, most recent first
#[utoipa::path(
    get,
    path = "/action/{action}",
    tag = "Activity",
    params(
        ("action" = String, Path, description = "Activity action: CREATE, UPDATE, DELETE or LOGIN"),
        ActivityQuery
    ),
    responses(
        (status = 200, description = "One page of the action's audit records", body = ActivityPage),
        (status = 400, description = "Unknown activity action"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip(repository))]
async fn list_activity_by_action<R: ActivityRepository>(
    State(repository): State<Arc<R>>,
    Path(action): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> ActivityResult<Json<ActivityPage>> {
    let action: ActivityAction = action
        .parse()
        .map_err(|_| ActivityError::UnknownAction(action))?;

    let page = repository.list_by_action(action, query).await?;
    Ok(Json(page))
}
