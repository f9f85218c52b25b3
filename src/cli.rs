//! # Command Line Interface
//!
//! Entry point for the `ephemera` binary: serve the API or print the effective
//! configuration.

use clap::{Parser, Subcommand};

use crate::config::{load_config, AppConfig};
use crate::storage::pool::sanitize_url;

#[derive(Debug, Parser)]
#[command(name = "ephemera")]
#[command(about = "Ephemera limited-view secret sharing service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Validate configuration and print the effective values as JSON
    CheckConfig,
}

impl Cli {
    /// Fold command line overrides into `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if self.verbose {
            config.observability.log_level = "debug".to_string();
        }

        if let Some(Commands::Serve { port, host }) = &self.command {
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(host) = host {
                config.server.host = host.clone();
            }
        }
    }
}

/// Render `config` for `check-config`, with store credentials masked
pub fn render_config(config: &AppConfig) -> serde_json::Result<String> {
    let mut shown = config.clone();
    shown.store.redis_url = sanitize_url(&config.store.redis_url);
    serde_json::to_string_pretty(&shown)
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    match cli.command {
        Some(Commands::CheckConfig) => {
            println!("{}", render_config(&config)?);
        }

        Some(Commands::Serve { .. }) | None => {
            crate::observability::init_observability(&config.observability).await?;
            crate::observability::log_config_info(&config);
            crate::run_server(config).await?;
        }
    }

    Ok(())
}
