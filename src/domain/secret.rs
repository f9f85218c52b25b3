//! The stored secret record.
//!
//! A [`Secret`] is persisted as JSON under its handle and returned verbatim to
//! API callers (JSON or XML). Field names on the wire are `hash`,
//! `secretText`, `createdAt`, `expiresAt` and `remainingViews`.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StoreExpiry;

/// A limited-view secret
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Secret", rename_all = "camelCase")]
pub struct Secret {
    /// Public handle, also the storage key
    #[serde(rename = "hash")]
    pub handle: String,

    /// Protected payload, stored and returned untouched
    #[serde(rename = "secretText")]
    pub text: String,

    /// Creation instant
    pub created_at: DateTime<Utc>,

    /// Absolute expiry; equal to `created_at` when no expiry was requested
    pub expires_at: DateTime<Utc>,

    /// Reads still permitted
    pub remaining_views: u32,
}

impl Secret {
    /// Build a fresh secret that expires `ttl` after `now`.
    pub fn new(
        handle: impl Into<String>,
        text: impl Into<String>,
        remaining_views: u32,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            handle: handle.into(),
            text: text.into(),
            created_at: now,
            expires_at: now + ttl,
            remaining_views,
        }
    }

    /// Records with `created_at == expires_at` never expire by time.
    pub fn has_expiry(&self) -> bool {
        self.created_at != self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.has_expiry() && now >= self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_views == 0
    }

    /// Whether a consume at `now` may return this secret.
    pub fn is_readable(&self, now: DateTime<Utc>) -> bool {
        !self.is_exhausted() && !self.is_expired(now)
    }

    /// Copy of this secret with one view spent, or `None` if none are left.
    pub fn with_view_spent(&self) -> Option<Self> {
        let remaining_views = self.remaining_views.checked_sub(1)?;
        Some(Self { remaining_views, ..self.clone() })
    }

    /// Backend expiry to apply when this record is written at `now`.
    ///
    /// Derived from `expires_at` so that rewrites never push the absolute
    /// expiry back. A deadline already in the past yields a zero duration,
    /// which stores treat as immediate expiry.
    pub fn store_expiry(&self, now: DateTime<Utc>) -> StoreExpiry {
        if !self.has_expiry() {
            return StoreExpiry::Never;
        }

        let remaining = (self.expires_at - now).to_std().unwrap_or(std::time::Duration::ZERO);
        StoreExpiry::After(remaining)
    }

    /// Serialize to the persisted JSON form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse the persisted JSON form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

// The payload must never end up in logs.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("handle", &self.handle)
            .field("text", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("remaining_views", &self.remaining_views)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_computes_absolute_expiry() {
        let secret = Secret::new("abc", "hello", 3, Duration::minutes(10), at(0));
        assert_eq!(secret.created_at, at(0));
        assert_eq!(secret.expires_at, at(600));
        assert!(secret.has_expiry());
        assert!(secret.is_readable(at(599)));
        assert!(!secret.is_readable(at(600)));
    }

    #[test]
    fn test_sentinel_never_expires() {
        let secret = Secret::new("abc", "hello", 1, Duration::zero(), at(0));
        assert!(!secret.has_expiry());
        assert!(!secret.is_expired(at(1_000_000)));
        assert_eq!(secret.store_expiry(at(50)), StoreExpiry::Never);
    }

    #[test]
    fn test_with_view_spent() {
        let secret = Secret::new("abc", "hello", 1, Duration::minutes(1), at(0));
        let spent = secret.with_view_spent().unwrap();
        assert_eq!(spent.remaining_views, 0);
        assert!(spent.is_exhausted());
        assert_eq!(spent.expires_at, secret.expires_at);
        assert!(spent.with_view_spent().is_none());
    }

    #[test]
    fn test_store_expiry_tracks_absolute_deadline() {
        let secret = Secret::new("abc", "hello", 2, Duration::minutes(10), at(0));
        assert_eq!(
            secret.store_expiry(at(60)),
            StoreExpiry::After(std::time::Duration::from_secs(540))
        );
        assert_eq!(secret.store_expiry(at(600)), StoreExpiry::After(std::time::Duration::ZERO));
        assert_eq!(secret.store_expiry(at(9_000)), StoreExpiry::After(std::time::Duration::ZERO));
    }

    #[test]
    fn test_wire_field_names() {
        let secret = Secret::new("h4sh", "hello", 2, Duration::minutes(5), at(0));
        let value: serde_json::Value = serde_json::from_slice(&secret.to_bytes().unwrap()).unwrap();

        assert_eq!(value["hash"], "h4sh");
        assert_eq!(value["secretText"], "hello");
        assert_eq!(value["remainingViews"], 2);
        assert!(value["createdAt"].is_string());
        assert!(value["expiresAt"].is_string());
    }

    #[test]
    fn test_reads_record_with_nanosecond_timestamps() {
        let raw = br#"{"hash":"Xy12Ab34Cd","secretText":"s3cr3t","createdAt":"2019-05-01T10:00:00.123456789+02:00","expiresAt":"2019-05-01T10:10:00.123456789+02:00","remainingViews":4}"#;
        let secret = Secret::from_bytes(raw).unwrap();
        assert_eq!(secret.handle, "Xy12Ab34Cd");
        assert_eq!(secret.remaining_views, 4);
        assert_eq!(secret.expires_at - secret.created_at, Duration::minutes(10));
    }

    #[test]
    fn test_malformed_record_rejected() {
        assert!(Secret::from_bytes(b"not json").is_err());
        assert!(Secret::from_bytes(br#"{"hash":"a","remainingViews":-1}"#).is_err());
    }

    #[test]
    fn test_debug_redacts_text() {
        let secret = Secret::new("abc", "top secret", 1, Duration::minutes(1), at(0));
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("top secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
