//! Best-effort client metadata extraction.
//!
//! Activity events record the caller's IP address and user agent when they
//! can be determined. Proxy headers win over the peer socket address because
//! the services normally sit behind a load balancer.
//!
//! # Example
//! ```ignore
//! use axum_helpers::client_info::ClientInfo;
//!
//! async fn create_user(client: ClientInfo /* , ... */) {
//!     tracing::info!(ip = client.ip, agent = client.user_agent, "Creating user");
//! }
//! ```

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Client metadata captured from an incoming request.
///
/// Both fields are optional and extraction never fails the request.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Client IP address from proxy headers or the peer socket
    pub ip: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self {
            ip: extract_ip_from_headers(&parts.headers).or_else(|| extract_ip_from_socket(socket)),
            user_agent: extract_user_agent(&parts.headers),
        })
    }
}

/// Extract client IP address from HTTP headers.
///
/// Checks X-Forwarded-For and X-Real-IP headers to get the real client IP
/// when behind a proxy or load balancer.
///
/// Returns the first IP from X-Forwarded-For (most accurate) or X-Real-IP as fallback.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// Extract client IP address from socket address.
///
/// Use this as a fallback when proxy headers are not available.
pub fn extract_ip_from_socket(socket: Option<SocketAddr>) -> Option<String> {
    socket.map(|addr| addr.ip().to_string())
}

/// Extract user agent string from HTTP headers.
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
