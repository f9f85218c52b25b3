use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::negotiate::{Negotiated, ResponseFormat};
use crate::lifecycle::LifecycleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        ApiError::Internal(msg.into())
    }

    /// Attach the response format negotiated for the request.
    pub fn with_format(self, format: ResponseFormat) -> Negotiated<ErrorBody> {
        Negotiated::new(format, self.status_code(), ErrorBody { message: self.message().to_string() })
    }
}

/// Error payload; `{"message": ...}` or `<Error><message>...</message></Error>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "Error")]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.with_format(ResponseFormat::Json).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation { field, message } => {
                ApiError::BadRequest(format!("{} {}", field, message))
            }
            LifecycleError::NotFound { .. } => ApiError::NotFound("Secret not found".to_string()),
            // Detail is logged by the lifecycle engine, never returned
            LifecycleError::Storage { .. } => ApiError::Internal("Internal server error".to_string()),
        }
    }
}
