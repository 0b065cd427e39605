//! HTTP middleware module.
//!
//! Security headers applied to every response. CORS is configured by
//! `server::create_router` from the `CORS_ALLOWED_ORIGIN` variable.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::security_headers;
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers));
//! ```

pub mod security;

pub use security::security_headers;
