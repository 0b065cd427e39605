use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_activity::ActivityPublisher;
use domain_users::{InMemoryUserRepository, UserService};
use std::time::Duration;
use stream_broker::BrokerClient;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // Bring up the broker connection. Failure is non-fatal: the API keeps
    // serving and only the audit trail degrades until the broker returns.
    let broker = BrokerClient::new(config.broker.clone());
    broker.connect_or_degraded().await;

    let publisher = ActivityPublisher::new(broker.clone());

    // In-process user store standing in for the primary user database
    let service = UserService::new(InMemoryUserRepository::new());

    let jwt_auth = axum_helpers::JwtAuth::new(&config.jwt);

    // Initialize the application state
    let state = AppState {
        config,
        broker,
        service,
        publisher,
        jwt_auth,
    };

    // Build router with API routes (pass reference, not ownership!)
    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints into the app
    // - /health: liveness check with app name/version
    // - /ready: readiness check reporting the broker state
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting roster API with production-ready shutdown (30s timeout)");

    // Production-ready server with graceful shutdown and cleanup
    // State moves here for cleanup
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30), // 30s graceful shutdown timeout
        async move {
            info!("Shutting down: disconnecting from the broker");
            state.broker.disconnect().await;
            info!("Broker connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Roster API shutdown complete");
    Ok(())
}
