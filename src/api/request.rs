//! Form decoding for `POST /v1/secret`.
//!
//! Numeric fields arrive as text so that a missing or non-integer value can be
//! reported against the field that carried it.

use chrono::Duration;
use serde::Deserialize;

use crate::lifecycle::engine::{FIELD_TTL, FIELD_VIEWS};
use crate::lifecycle::LifecycleError;

/// Raw `application/x-www-form-urlencoded` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSecretForm {
    #[serde(default)]
    pub secret: Option<String>,

    #[serde(default, rename = "expireAfterViews")]
    pub expire_after_views: Option<String>,

    /// Minutes until expiry; zero expires immediately
    #[serde(default, rename = "expireAfter")]
    pub expire_after: Option<String>,
}

/// Decoded create request, ready for the lifecycle engine
#[derive(Clone, PartialEq, Eq)]
pub struct CreateSecretRequest {
    pub text: String,
    pub remaining_views: i64,
    pub ttl: Duration,
}

// Keeps the secret text out of logs.
impl std::fmt::Debug for CreateSecretRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSecretRequest")
            .field("remaining_views", &self.remaining_views)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TryFrom<CreateSecretForm> for CreateSecretRequest {
    type Error = LifecycleError;

    fn try_from(form: CreateSecretForm) -> Result<Self, Self::Error> {
        let remaining_views = parse_integer(FIELD_VIEWS, form.expire_after_views.as_deref())?;
        let minutes = parse_integer(FIELD_TTL, form.expire_after.as_deref())?;
        let ttl = Duration::try_minutes(minutes)
            .ok_or_else(|| LifecycleError::validation(FIELD_TTL, "is too large"))?;

        Ok(Self { text: form.secret.unwrap_or_default(), remaining_views, ttl })
    }
}

fn parse_integer(field: &'static str, raw: Option<&str>) -> Result<i64, LifecycleError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LifecycleError::validation(field, "is required"))?;

    raw.parse::<i64>().map_err(|_| LifecycleError::validation(field, "must be an integer"))
}
