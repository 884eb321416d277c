//! Axum middleware applying the per-client limiter

use crate::ratelimit::config::ClientIpPolicy;
use crate::ratelimit::limiter::RateLimiter;
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Derive the client identifier for a request
pub fn client_id(policy: ClientIpPolicy, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let from_header = match (policy, forwarded) {
        (ClientIpPolicy::TrustForwarded, Some(value)) => Some(value.to_string()),
        (ClientIpPolicy::RightmostForwarded, Some(value)) => value
            .rsplit(',')
            .map(str::trim)
            .find(|entry| !entry.is_empty())
            .map(str::to_string),
        _ => None,
    };

    from_header
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Peer address as seen by `ConnectInfo`, including `MockConnectInfo` in
/// tests. `None` when the router was served without connect info.
async fn peer_addr(request: Request) -> (Request, Option<SocketAddr>) {
    let (mut parts, body) = request.into_parts();
    let peer = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|ConnectInfo(addr)| addr);
    (Request::from_parts(parts, body), peer)
}

/// Reject with 429 when the caller's bucket is empty, otherwise forward
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let (request, peer) = peer_addr(request).await;
    let client = client_id(limiter.config().client_ip, request.headers(), peer);

    if !limiter.allow(&client) {
        warn!(client = %client, "Rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }

    next.run(request).await
}
