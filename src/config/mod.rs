//! # Configuration Management
//!
//! Layered configuration for the Ephemera service: built-in defaults, then an
//! optional configuration file, then `EPHEMERA__*` environment variables.
//!
//! ```text
//! EPHEMERA__SERVER__PORT=8080
//! EPHEMERA__STORE__REDIS_URL=redis://cache:6379/0
//! EPHEMERA__LIFECYCLE__MAX_VIEWS=100
//! ```

pub mod settings;

pub use settings::{
    AppConfig, LifecycleConfig, ObservabilityConfig, ServerConfig, StoreBackend, StoreConfig,
};

use crate::errors::Result;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "EPHEMERA";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Load and validate configuration.
///
/// A missing file is not an error; defaults and the environment still apply.
pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let defaults = config::Config::try_from(&AppConfig::default())?;

    let mut builder = config::Config::builder().add_source(defaults);

    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    let config: AppConfig = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;

    Ok(config)
}
