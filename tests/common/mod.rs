//! Common test utilities for all integration tests.
//!
//! Builds the full router over an in-memory store and drives it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use ephemera::{
    api::{build_router, ApiState},
    config::{LifecycleConfig, ServerConfig},
    storage::{InMemorySecretStore, SecretStore},
    SecretLifecycle,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Router and the store behind it
pub struct TestApp {
    pub router: Router,
    pub store: InMemorySecretStore,
    pub lifecycle: Arc<SecretLifecycle>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(LifecycleConfig::default())
    }

    pub fn with_config(config: LifecycleConfig) -> Self {
        let store = InMemorySecretStore::new();
        Self::with_store(Arc::new(store.clone()), store, config)
    }

    /// Serve from `backend`; `store` is kept for direct inspection.
    pub fn with_store(
        backend: Arc<dyn SecretStore>,
        store: InMemorySecretStore,
        config: LifecycleConfig,
    ) -> Self {
        Self::with_server(backend, store, config, Duration::from_secs(2), &ServerConfig::default())
    }

    /// Full control over the engine's store timeout and the server settings
    pub fn with_server(
        backend: Arc<dyn SecretStore>,
        store: InMemorySecretStore,
        config: LifecycleConfig,
        operation_timeout: Duration,
        server: &ServerConfig,
    ) -> Self {
        let lifecycle = Arc::new(SecretLifecycle::new(backend, config, operation_timeout));
        let router = build_router(ApiState::new(lifecycle.clone()), server);
        Self { router, store, lifecycle }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse { status, content_type, body: String::from_utf8(bytes.to_vec()).unwrap() }
    }

    /// Create a secret through the API and return its handle
    pub async fn create(&self, secret: &str, views: u32, minutes: i64) -> String {
        let body = format!("secret={}&expireAfterViews={}&expireAfter={}", secret, views, minutes);
        let response = self.send(create_request(&body, None)).await;
        assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
        response.json()["hash"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, hash: &str) -> TestResponse {
        self.send(get_request(hash, None)).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub fn create_request(body: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/v1/secret")
        .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(hash: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(format!("/v1/secret/{}", hash));
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Body::empty()).unwrap()
}
