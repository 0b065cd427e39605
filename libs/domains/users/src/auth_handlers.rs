//! Authentication endpoints.
//!
//! Login is stateless: a successful credential check mints an HS256 access
//! token and publishes a LOGIN activity event. Invalid credentials return
//! 401 and publish nothing.

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::errors::responses::{BadRequestValidationResponse, UnauthorizedResponse};
use axum_helpers::{ClientInfo, JwtAuth, ValidatedJson};
use domain_activity::models::ActivityEvent;
use domain_activity::publisher::ActivityPublisher;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, LoginResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the Auth API
#[derive(OpenApi)]
#[openapi(
    paths(login),
    components(
        schemas(LoginRequest, LoginResponse),
        responses(BadRequestValidationResponse, UnauthorizedResponse)
    ),
    tags(
        (name = "Auth", description = "Authentication endpoints")
    )
)]
pub struct ApiDoc;

/// Shared state for the auth routes
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub publisher: ActivityPublisher,
    pub jwt_auth: JwtAuth,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            publisher: self.publisher.clone(),
            jwt_auth: self.jwt_auth.clone(),
        }
    }
}

/// Create the auth router
pub fn router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new().route("/login", post(login)).with_state(state)
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    client: ClientInfo,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<LoginResponse>> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;

    let access_token = state
        .jwt_auth
        .create_access_token(user.id, &user.email)
        .map_err(|e| {
            tracing::error!("Failed to create access token: {}", e);
            UserError::Internal("token creation failed".to_string())
        })?;

    let event = ActivityEvent::login(user.id, user.email.clone(), user.name.clone())
        .with_client(client.ip, client.user_agent);
    state.publisher.publish(event).await;

    Ok(Json(LoginResponse { user, access_token }))
}
