//! Stateless JWT authentication.
//!
//! Access tokens are HS256-signed and carry the user id and email. There is
//! no server-side session state; a token is valid until it expires.

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
