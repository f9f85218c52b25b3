//! # HTTP Request Tracing Middleware
//!
//! Axum middleware that runs every request inside a `request_span!` span and
//! records request metrics once the response is ready.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use http::header::CONTENT_LENGTH;
use tracing::Instrument;

use super::metrics::MetricsRecorder;

/// Axum middleware that traces and measures each HTTP request
///
/// The span carries method, path and a fresh request id; the status is
/// recorded on it when the response comes back.
pub async fn trace_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = normalize_path_for_metrics(&path);
    let start = Instant::now();

    let span = crate::request_span!(method, path, route = %route);
    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();
    span.record("status", status);

    span.in_scope(|| {
        tracing::debug!(status, elapsed_ms = elapsed.as_millis() as u64, "Request completed");
    });

    let response_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    MetricsRecorder::new().record_http_request(
        &method,
        &route,
        status,
        elapsed.as_secs_f64(),
        response_bytes,
    );

    response
}

/// Normalize path for metrics to avoid high cardinality
///
/// Secret handles are replaced by `:hash`; paths outside the API collapse to
/// a single label so that scans for random URLs do not create new series.
fn normalize_path_for_metrics(path: &str) -> String {
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    match segments.as_slice() {
        ["", "v1", "secret"] => "/v1/secret".to_string(),
        ["", "v1", "secret", handle] if !handle.is_empty() => "/v1/secret/:hash".to_string(),
        ["", "healthz"] => "/healthz".to_string(),
        _ => "unmatched".to_string(),
    }
}
