//! Activity Worker Service
//!
//! A background worker that consumes user activity events from the Redis
//! stream and appends them to the MongoDB audit store. The same process
//! serves the audit query API and Kubernetes probes on an admin port.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (user-activity)
//!   ↓ (Consumer Group: activity-log-consumer-group)
//! StreamWorker<ActivityProcessor>
//!   ↓ (append)
//! MongoActivityRepository
//!   ↓
//! MongoDB (activity_log collection)
//!   ↑ (list queries)
//! Admin server (/health, /ready, /api/activity)
//! ```
//!
//! ## Features
//!
//! - Consumer group support for horizontal scaling
//! - At-least-once delivery with pending-entry claims
//! - Graceful shutdown that finishes the in-flight batch
//! - Health and readiness endpoints for Kubernetes probes
//! - Read-only audit query API backed by the same repository

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{
    HealthCheckFuture, health_router, run_health_checks, spawn_shutdown_watch,
};
use core_config::{AppInfo, Environment, FromEnv, app_info};
use database::mongodb::{MongoConfig, connect_from_config_with_retry};
use domain_activity::{ActivityProcessor, ActivityStream, MongoActivityRepository};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use stream_broker::{BrokerClient, BrokerConfig, StreamWorker, WorkerConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Dependencies the readiness probe verifies.
#[derive(Clone)]
struct ProbeState {
    broker: BrokerClient,
    mongo: database::mongodb::Client,
}

/// Readiness check endpoint that actually pings the broker and the store.
///
/// Uses the generic `run_health_checks` utility from axum-helpers, so the
/// response shape matches the API's readiness endpoint.
async fn ready_handler(State(state): State<ProbeState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "broker",
            Box::pin(async {
                state
                    .broker
                    .ping()
                    .await
                    .map_err(|e| format!("Broker ping failed: {}", e))
            }),
        ),
        (
            "mongodb",
            Box::pin(async {
                if database::mongodb::check_health(&state.mongo).await {
                    Ok(())
                } else {
                    Err("MongoDB health check failed".to_string())
                }
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

/// Start the admin HTTP server.
///
/// Provides endpoints for:
/// - Liveness probes: `/health`
/// - Readiness probes: `/ready` (broker + MongoDB checks)
/// - Audit queries: `/api/activity`, `/api/activity/actor/{actor_id}`,
///   `/api/activity/action/{action}`
async fn start_admin_server(
    repository: Arc<MongoActivityRepository>,
    probe_state: ProbeState,
    app_info: AppInfo,
    port: u16,
) -> Result<()> {
    let ready = Router::new()
        .route("/ready", get(ready_handler))
        .with_state(probe_state);

    let app = Router::new()
        .merge(health_router(app_info))
        .merge(ready)
        .nest("/api/activity", domain_activity::handlers::router(repository));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind admin server to {}", addr))?;

    info!(port = %port, "Admin server listening");

    axum::serve(listener, app)
        .await
        .wrap_err("Admin server failed")?;

    Ok(())
}

/// Run the activity worker
///
/// This is the main entry point for the worker. It:
/// 1. Sets up structured logging (env-aware: JSON for prod, pretty for dev)
/// 2. Connects to MongoDB and ensures the audit log indexes
/// 3. Connects to the broker
/// 4. Starts the admin server and the worker with graceful shutdown handling
///
/// # Errors
///
/// Returns an error if:
/// - MongoDB configuration is invalid or the connection fails
/// - Broker configuration is invalid or the retry budget is exhausted
/// - The worker encounters a fatal error
pub async fn run() -> Result<()> {
    // Initialize tracing (env-aware: JSON for prod, pretty for dev)
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    // App info for the health endpoint
    let app_info = app_info!();

    info!(name = %app_info.name, version = %app_info.version, "Starting activity worker service");
    info!("Environment: {:?}", environment);

    // Admin server port (default 8081)
    // Checks ACTIVITY_WORKER_PORT first, then HEALTH_PORT, then default
    let admin_port: u16 = std::env::var("ACTIVITY_WORKER_PORT")
        .or_else(|_| std::env::var("HEALTH_PORT"))
        .unwrap_or_else(|_| "8081".to_string())
        .parse()
        .unwrap_or(8081);

    // Load MongoDB configuration from the environment
    let mongo_config = MongoConfig::from_env().wrap_err("Failed to load MongoDB configuration")?;

    // Connect to MongoDB with retry logic
    info!("Connecting to MongoDB...");
    let mongo_client = connect_from_config_with_retry(&mongo_config, None)
        .await
        .wrap_err("Failed to connect to MongoDB")?;
    info!(database = %mongo_config.database, "Connected to MongoDB successfully");

    // Create the audit repository and ensure the indexes the list
    // endpoints rely on
    let repository = Arc::new(MongoActivityRepository::new(
        mongo_client.database(mongo_config.database()),
    ));
    repository
        .create_indexes()
        .await
        .wrap_err("Failed to create activity log indexes")?;

    // Connect to the broker. Unlike the API, the worker cannot run degraded:
    // its whole job is draining the stream, so an unreachable broker is fatal.
    let broker_config = BrokerConfig::from_env().wrap_err("Failed to load broker configuration")?;
    let broker = BrokerClient::new(broker_config);
    info!(url = %broker.url(), "Connecting to broker...");
    broker
        .connect()
        .await
        .wrap_err("Failed to connect to broker")?;

    // Create worker configuration from the activity stream definition
    let worker_config = WorkerConfig::from_stream_def::<ActivityStream>();
    info!(
        stream = %worker_config.stream_name,
        consumer_group = %worker_config.consumer_group,
        consumer_id = %worker_config.consumer_id,
        batch_size = %worker_config.batch_size,
        block_timeout_ms = %worker_config.block_timeout_ms,
        "Worker configuration loaded"
    );

    let processor = ActivityProcessor::new(Arc::clone(&repository));
    info!("Activity processor initialized");

    // Flips to true on SIGTERM/SIGINT; the worker finishes the in-flight
    // batch before it observes the flag
    let shutdown_rx = spawn_shutdown_watch();

    // Start the admin server in the background
    let probe_state = ProbeState {
        broker: broker.clone(),
        mongo: mongo_client.clone(),
    };
    let admin_repository = Arc::clone(&repository);
    tokio::spawn(async move {
        if let Err(e) = start_admin_server(admin_repository, probe_state, app_info, admin_port).await
        {
            error!(error = %e, "Admin server failed");
        }
    });

    // Run the worker
    info!("Starting activity event processor...");
    let worker = StreamWorker::new(broker.clone(), processor, worker_config);
    worker
        .run(shutdown_rx)
        .await
        .map_err(|e| eyre::eyre!("{}", e))?;

    broker.disconnect().await;

    info!("Activity worker service stopped");
    Ok(())
}
