use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::ServerConfig;
use crate::lifecycle::SecretLifecycle;
use crate::observability::trace_http_requests;

use super::deadline::enforce_request_deadline;
use super::handlers::{
    create_secret_handler, get_secret_handler, health_handler, not_found_handler,
};

#[derive(Debug, Clone)]
pub struct ApiState {
    pub lifecycle: Arc<SecretLifecycle>,
}

impl ApiState {
    pub fn new(lifecycle: Arc<SecretLifecycle>) -> Self {
        Self { lifecycle }
    }
}

/// Build the HTTP router.
///
/// Only `POST /v1/secret`, `GET /v1/secret/{hash}` and `GET /healthz` are
/// served; every other method or path gets a 404 error body.
pub fn build_router(state: ApiState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/v1/secret", post(create_secret_handler))
        .route("/v1/secret/{hash}", get(get_secret_handler))
        .route("/healthz", get(health_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(middleware::from_fn_with_state(config.request_timeout(), enforce_request_deadline))
        .layer(middleware::from_fn(trace_http_requests))
}
