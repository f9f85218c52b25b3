//! Integration tests for configuration management
//!
//! These tests load configuration the way the binary does (file, then
//! environment, then command line) and check that the result drives a working
//! server.

use std::env;
use std::io::Write;
use std::sync::Mutex;

use clap::Parser;
use ephemera::{
    cli::Cli,
    config::{load_config, StoreBackend},
    Result, Server,
};

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Set variables for the duration of `f`, restoring the previous values after
fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let originals: Vec<_> = vars.iter().map(|(key, _)| (*key, env::var(key).ok())).collect();
    for (key, value) in vars {
        env::set_var(key, value);
    }

    let result = f();

    for (key, original) in originals {
        match original {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
    result
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_environment_overrides_file() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();

    let file = config_file(
        r#"
[server]
port = 8300

[store]
backend = "memory"

[lifecycle]
max_views = 50
"#,
    );

    let config = with_env(&[("EPHEMERA__LIFECYCLE__MAX_VIEWS", "20")], || {
        load_config(file.path().to_str())
    })?;

    assert_eq!(config.server.port, 8300);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.lifecycle.max_views, Some(20));

    Ok(())
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();

    let file = config_file("[store]\noperation_timeout_ms = 0\n");
    assert!(load_config(file.path().to_str()).is_err());

    let file = config_file("[server]\nport = \"not-a-port\"\n");
    assert!(load_config(file.path().to_str()).is_err());
}

#[test]
fn test_command_line_overrides_environment() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();

    let mut config = with_env(&[("EPHEMERA__SERVER__PORT", "8400")], || load_config(None))?;
    assert_eq!(config.server.port, 8400);

    let cli = Cli::parse_from(["ephemera", "--verbose", "serve", "--port", "8500", "--host", "127.0.0.1"]);
    cli.apply_overrides(&mut config);
    config.validate()?;

    assert_eq!(config.server.bind_address(), "127.0.0.1:8500");
    assert_eq!(config.observability.log_level, "debug");

    Ok(())
}

#[tokio::test]
async fn test_loaded_config_builds_server() -> Result<()> {
    let config = {
        let _guard = ENV_MUTEX.lock().unwrap();
        with_env(
            &[
                ("EPHEMERA__STORE__BACKEND", "memory"),
                ("EPHEMERA__OBSERVABILITY__ENABLE_METRICS", "false"),
                ("EPHEMERA__STORE__OPERATION_TIMEOUT_MS", "500"),
            ],
            || load_config(None),
        )?
    };

    let server = Server::new(config).await?;
    assert_eq!(server.lifecycle().store().backend_name(), "memory");
    assert_eq!(server.config().store.operation_timeout().as_millis(), 500);

    let created = server.lifecycle().create("from-config", 1, chrono::Duration::minutes(1)).await.unwrap();
    let read = server.lifecycle().consume(&created.handle).await.unwrap();
    assert_eq!(read.text, "from-config");

    Ok(())
}
