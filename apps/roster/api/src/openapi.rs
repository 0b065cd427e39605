use utoipa::OpenApi;

/// Top-level OpenAPI document for the roster API.
///
/// The domain crates own their path documentation; this document nests them
/// under the prefixes `api::routes` mounts them at.
#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Roster API",
        version = "0.1.0",
        description = "User management API with an asynchronous activity audit trail"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/users", api = domain_users::handlers::ApiDoc),
        (path = "/auth", api = domain_users::auth_handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
