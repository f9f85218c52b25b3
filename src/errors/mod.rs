//! # Error Handling
//!
//! Application-level errors for the Ephemera service: configuration, startup
//! and serving failures. Errors produced by the secret lifecycle itself live in
//! [`crate::lifecycle::LifecycleError`] and are mapped to HTTP responses at the
//! transport boundary.

/// Custom result type for Ephemera operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Ephemera service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (HTTP listener, metrics exporter)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backing store errors raised outside of a lifecycle operation
    #[error("Store error: {0}")]
    Store(#[from] crate::storage::StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::Config(format!("Configuration loading failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::Config(format!("Validation failed: {}", message))
    }
}
