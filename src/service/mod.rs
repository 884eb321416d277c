//! HTTP surface of the API process
//!
//! Two routes:
//!
//! - `GET /articles/latest`: the window store as a JSON array, oldest first,
//!   behind the per-client rate limiter
//! - `GET /health`: liveness probe, never rate limited
//!
//! Every other method on either path is answered with 405.

mod server;

pub use server::{ApiServer, ServerConfig};

use crate::ratelimit::{rate_limit, RateLimiter};
use crate::store::WindowStore;
use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, Router},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, error};

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state behind the router
#[derive(Clone, Debug)]
pub struct ApiService {
    store: Arc<WindowStore>,
    limiter: Arc<RateLimiter>,
    request_timeout: Duration,
}

impl ApiService {
    /// Serve `store`, limiting `/articles/latest` through `limiter`
    pub fn new(store: Arc<WindowStore>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            store,
            limiter,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Window store being served
    pub fn store(&self) -> &Arc<WindowStore> {
        &self.store
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        let limited = Router::new()
            .route(
                "/articles/latest",
                get(Self::latest_handler)
                    .head(Self::method_not_allowed)
                    .fallback(Self::method_not_allowed),
            )
            .route_layer(middleware::from_fn_with_state(
                self.limiter.clone(),
                rate_limit,
            ));

        Router::new()
            .route(
                "/health",
                get(Self::health_handler)
                    .head(Self::method_not_allowed)
                    .fallback(Self::method_not_allowed),
            )
            .merge(limited)
            .with_state(self.clone())
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(TraceLayer::new_for_http())
    }

    async fn latest_handler(State(service): State<ApiService>) -> Response {
        let articles = service.store.latest();

        match serde_json::to_vec(&articles) {
            Ok(body) => {
                debug!("Serving {} articles", articles.len());
                ([(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Err(e) => {
                error!("Failed to encode latest articles: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }

    async fn health_handler() -> &'static str {
        "healthy"
    }

    async fn method_not_allowed() -> (StatusCode, &'static str) {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }
}
