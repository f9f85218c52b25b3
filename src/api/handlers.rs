use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Secret;

use super::error::{ApiError, ErrorBody};
use super::negotiate::{Negotiated, ResponseFormat};
use super::request::{CreateSecretForm, CreateSecretRequest};
use super::routes::ApiState;

type Handled<T> = Result<Negotiated<T>, Negotiated<ErrorBody>>;

/// `POST /v1/secret`
pub async fn create_secret_handler(
    State(state): State<ApiState>,
    format: ResponseFormat,
    form: Result<Form<CreateSecretForm>, FormRejection>,
) -> Handled<Secret> {
    let Form(form) = form.map_err(|rejection| {
        debug!(error = %rejection, "Rejected create request body");
        ApiError::bad_request("Invalid form body").with_format(format)
    })?;

    let request = CreateSecretRequest::try_from(form).map_err(|err| {
        warn!(error = %err, "Rejected create request");
        ApiError::from(err).with_format(format)
    })?;

    let secret = state
        .lifecycle
        .create(&request.text, request.remaining_views, request.ttl)
        .await
        .map_err(|err| ApiError::from(err).with_format(format))?;

    Ok(Negotiated::ok(format, secret))
}

/// `GET /v1/secret/{hash}`
pub async fn get_secret_handler(
    State(state): State<ApiState>,
    format: ResponseFormat,
    Path(hash): Path<String>,
) -> Handled<Secret> {
    let secret =
        state.lifecycle.consume(&hash).await.map_err(|err| ApiError::from(err).with_format(format))?;

    Ok(Negotiated::ok(format, secret))
}

/// Any unmatched method or path
pub async fn not_found_handler(format: ResponseFormat) -> Negotiated<ErrorBody> {
    ApiError::not_found("Not found").with_format(format)
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "unavailable"
    pub status: String,
    /// Active store backend
    pub store: String,
}

/// `GET /healthz`
///
/// Returns 200 when the store answers a ping, 503 otherwise.
pub async fn health_handler(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.lifecycle.store().backend_name().to_string();

    match state.lifecycle.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok".to_string(), store })),
        Err(err) => {
            warn!(error = %err, store = %store, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "unavailable".to_string(), store }),
            )
        }
    }
}
