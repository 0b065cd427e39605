use axum::Router;
use domain_users::auth_handlers::{self, AuthState};
use domain_users::handlers::{self, UsersState};

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Each domain router receives its own slice of the state and comes back
/// stateless, so the composed Router can be handed to `create_router`.
pub fn routes(state: &crate::state::AppState) -> Router {
    let users = handlers::router(
        UsersState {
            service: state.service.clone(),
            publisher: state.publisher.clone(),
        },
        state.jwt_auth.clone(),
    );

    let auth = auth_handlers::router(AuthState {
        service: state.service.clone(),
        publisher: state.publisher.clone(),
        jwt_auth: state.jwt_auth.clone(),
    });

    Router::new()
        .nest("/users", users) // Registration open, the rest behind the JWT guard
        .nest("/auth", auth) // Login at /api/auth/login
}

/// Creates a router with the /ready endpoint.
///
/// This router has state applied and can be merged with the stateless app
/// router from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
