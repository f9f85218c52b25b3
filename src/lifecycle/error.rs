//! Errors returned by secret lifecycle operations.

use crate::storage::StoreError;

/// Outcome classes of a failed create or consume
///
/// The set is closed: the transport layer maps each variant to exactly one
/// response status.
#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    /// Caller input was rejected before any store interaction.
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The handle is absent, exhausted or expired.
    #[error("Secret not found")]
    NotFound { handle: String },

    /// The backend failed, timed out, or held a record that could not be read.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

impl LifecycleError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    pub fn not_found(handle: impl Into<String>) -> Self {
        Self::NotFound { handle: handle.into() }
    }

    /// Storage error with no underlying cause
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into(), source: None }
    }

    /// Storage error wrapping an underlying cause
    pub fn storage_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Low-cardinality label for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Storage { .. } => "storage",
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        let message = match &error {
            StoreError::Unavailable { .. } => "backing store is unavailable",
            StoreError::Timeout { .. } => "backing store did not answer in time",
            StoreError::Backend { .. } => "backing store rejected the operation",
        };
        Self::storage_with_source(message, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_reason_labels() {
        assert_eq!(LifecycleError::validation("secret", "must not be empty").reason(), "validation");
        assert_eq!(LifecycleError::not_found("abc").reason(), "not_found");
        assert_eq!(LifecycleError::storage("boom").reason(), "storage");
    }

    #[test]
    fn test_display() {
        let err = LifecycleError::validation("expireAfterViews", "must be at least 1");
        assert_eq!(err.to_string(), "Invalid expireAfterViews: must be at least 1");

        // The handle is not echoed back
        assert_eq!(LifecycleError::not_found("abc").to_string(), "Secret not found");
    }

    #[test]
    fn test_store_errors_become_storage() {
        let err: LifecycleError = StoreError::timeout("get", 2000).into();
        assert!(matches!(err, LifecycleError::Storage { .. }));
        assert!(err.source().is_some());

        let err: LifecycleError = StoreError::unavailable("refused").into();
        assert_eq!(err.reason(), "storage");
    }
}
