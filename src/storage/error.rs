//! Error types for key-value store operations.
//!
//! A missing key is not an error: adapters report it as `Ok(None)` or
//! `Ok(false)`. Everything here means the backend could not answer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures talking to the backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection refused, dropped, or otherwise unreachable.
    #[error("Store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend did not answer within the configured bound.
    #[error("Store operation '{operation}' timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// The backend answered with an error or an unexpected reply.
    #[error("Store backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into(), source: None }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Self::Timeout { operation: operation.into(), duration_ms }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into(), source: None }
    }

    /// Whether the error means the backend could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(error: redis::RedisError) -> Self {
        if error.is_timeout() {
            return Self::Timeout { operation: "redis".to_string(), duration_ms: 0 };
        }

        if error.is_io_error() || error.is_connection_refusal() || error.is_connection_dropped() {
            return Self::Unavailable {
                message: format!("Redis connection failed: {}", error),
                source: Some(Box::new(error)),
            };
        }

        Self::Backend { message: format!("Redis command failed: {}", error), source: Some(Box::new(error)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = StoreError::unavailable("connection refused");
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "Store unavailable: connection refused");

        let err = StoreError::timeout("get", 2000);
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "Store operation 'get' timed out after 2000ms");

        let err = StoreError::backend("WRONGTYPE");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_redis_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: StoreError = redis::RedisError::from(io).into();
        assert!(matches!(err, StoreError::Unavailable { .. }));

        let reply = redis::RedisError::from((redis::ErrorKind::TypeError, "unexpected reply"));
        let err: StoreError = reply.into();
        assert!(matches!(err, StoreError::Backend { .. }));
    }
}
