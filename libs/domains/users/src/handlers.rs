//! HTTP handlers for the users CRUD surface.
//!
//! Every successful mutation publishes an activity event after the domain
//! operation commits. Publishing is fire-and-forget: a dead broker logs a
//! warning and the request still succeeds. A failed domain operation
//! short-circuits before the publisher is ever invoked.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use axum_helpers::errors::responses::{
    BadRequestValidationResponse, ConflictResponse, NotFoundResponse, UnauthorizedResponse,
};
use axum_helpers::{ClientInfo, JwtAuth, ValidatedJson, jwt_auth_middleware};
use domain_activity::models::{ActivityEvent, EntityState};
use domain_activity::publisher::ActivityPublisher;
use serde_json::json;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    CreateUser, ListMeta, ListUsersQuery, UpdateUser, UserListResponse, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(create_user, list_users, get_user, update_user, delete_user),
    components(
        schemas(CreateUser, UpdateUser, UserResponse, UserListResponse, ListMeta),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Shared state for the users routes
pub struct UsersState<R: UserRepository> {
    pub service: UserService<R>,
    pub publisher: ActivityPublisher,
}

impl<R: UserRepository> Clone for UsersState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Create the users router.
///
/// Registration (`POST /`) is open; every other route requires a bearer
/// token.
pub fn router<R: UserRepository + 'static>(state: UsersState<R>, jwt_auth: JwtAuth) -> Router {
    let protected = Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).patch(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(jwt_auth, jwt_auth_middleware));

    Router::new()
        .route("/", post(create_user))
        .merge(protected)
        .with_state(state)
}

/// The `{email, name}` snapshot recorded in before/after audit states
fn audit_state(user: &UserResponse) -> EntityState {
    let mut state = EntityState::new();
    state.insert("email".to_string(), json!(user.email));
    state.insert("name".to_string(), json!(user.name));
    state
}

/// Register a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(state): State<UsersState<R>>,
    client: ClientInfo,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<(StatusCode, Json<UserResponse>)> {
    let user = state.service.create_user(input).await?;

    let event =
        ActivityEvent::created(user.id, user.email.clone(), user.name.clone(), audit_state(&user))
            .with_client(client.ip, client.user_agent);
    state.publisher.publish(event).await;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List users, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<UsersState<R>>,
    Query(query): Query<ListUsersQuery>,
) -> UserResult<Json<UserListResponse>> {
    let (data, total) = state.service.list_users(query).await?;
    Ok(Json(UserListResponse::new(data, total, query)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(state): State<UsersState<R>>,
    Path(id): Path<i64>,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.get_user(id).await?;
    Ok(Json(user))
}

/// Partially update a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "The updated user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(state): State<UsersState<R>>,
    Path(id): Path<i64>,
    client: ClientInfo,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    // The pre-update snapshot becomes the event's before state.
    let before = state.service.get_user(id).await?;
    let after = state.service.update_user(id, input).await?;

    let event = ActivityEvent::updated(
        after.id,
        after.email.clone(),
        after.name.clone(),
        audit_state(&before),
        audit_state(&after),
    )
    .with_client(client.ip, client.user_agent);
    state.publisher.publish(event).await;

    Ok(Json(after))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<UsersState<R>>,
    Path(id): Path<i64>,
    client: ClientInfo,
) -> UserResult<StatusCode> {
    // The last known state becomes the event's before state.
    let before = state.service.get_user(id).await?;
    state.service.delete_user(id).await?;

    let event = ActivityEvent::deleted(
        before.id,
        before.email.clone(),
        before.name.clone(),
        audit_state(&before),
    )
    .with_client(client.ip, client.user_agent);
    state.publisher.publish(event).await;

    Ok(StatusCode::NO_CONTENT)
}
