//! Whole-request deadline.
//!
//! A request still running when the deadline passes is answered with the
//! same 500 error body a storage failure produces, in the negotiated format.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::error::ApiError;
use super::negotiate::ResponseFormat;

pub async fn enforce_request_deadline(
    State(deadline): State<Duration>,
    format: ResponseFormat,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            error!(
                method = %method,
                path = %path,
                deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                "Request exceeded its deadline"
            );
            ApiError::internal("Internal server error").with_format(format).into_response()
        }
    }
}
