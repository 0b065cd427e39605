//! Users Domain
//!
//! User management for the roster service: CRUD, argon2 password hashing and
//! stateless JWT login. Every successful mutation and login publishes an
//! activity event to the audit stream; the publisher is fire-and-forget, so
//! user traffic never depends on the broker being up.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ Handlers (CRUD+auth) │ ← HTTP, JWT guard, activity publishing
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼──────┐
//! │     Service     │ ← password hashing, duplicate-email checks
//! └──────────┬──────┘
//!            │
//! ┌──────────▼──────┐
//! │   Repository    │ ← trait + in-memory implementation
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_activity::ActivityPublisher;
//! use domain_users::{
//!     InMemoryUserRepository, UserService,
//!     auth_handlers::{self, AuthState},
//!     handlers::{self, UsersState},
//! };
//! use stream_broker::{BrokerClient, BrokerConfig};
//!
//! # fn example() {
//! let service = UserService::new(InMemoryUserRepository::new());
//! let publisher = ActivityPublisher::new(BrokerClient::new(BrokerConfig::new(
//!     "redis://localhost:6379",
//! )));
//! let jwt_auth = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-32-characters!!"));
//!
//! let users = handlers::router(
//!     UsersState { service: service.clone(), publisher: publisher.clone() },
//!     jwt_auth.clone(),
//! );
//! let auth = auth_handlers::router(AuthState { service, publisher, jwt_auth });
//! # let _ = (users, auth);
//! # }
//! ```

pub mod auth_handlers;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use memory::InMemoryUserRepository;
pub use models::{
    CreateUser, ListUsersQuery, LoginRequest, LoginResponse, NewUser, UpdateUser, User,
    UserListResponse, UserResponse,
};
pub use repository::UserRepository;
pub use service::UserService;
