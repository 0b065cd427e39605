//! Application state management.
//!
//! This module defines the shared application state handed to the routers
//! at startup. Cloning it is cheap (Arc pointer clones).

use axum_helpers::JwtAuth;
use domain_activity::ActivityPublisher;
use domain_users::{InMemoryUserRepository, UserService};
use stream_broker::BrokerClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Broker connection shared by the publisher and the readiness probe
    pub broker: BrokerClient,
    /// User service over the in-process repository
    pub service: UserService<InMemoryUserRepository>,
    /// Fire-and-forget audit event publisher
    pub publisher: ActivityPublisher,
    /// Signer and verifier for the bearer tokens on protected routes
    pub jwt_auth: JwtAuth,
}
