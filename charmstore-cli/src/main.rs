//! charmstore - search and inspect the charm store catalog from the terminal

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use charmstore_core::{CharmStore, StoreConfig};

mod catalog_cli;

use catalog_cli::CatalogCommand;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "charmstore",
    about = "Search and inspect charms and bundles in the charm store",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: CatalogCommand,

    /// Set log level (RUST_LOG takes precedence when set)
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,

    /// Catalog API URL (overrides config file and CHARMSTORE_API_URL)
    #[clap(long, global = true)]
    api: Option<String>,

    /// Path to a config file (defaults to the platform config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

/// Initialize tracing with CLI flags
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr) // Critical: logs to stderr, not stdout
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr) // Critical: logs to stderr, not stdout
            .init();
    }
}

/// Resolve configuration: file, then environment, then CLI flags
fn resolve_config(config_path: Option<&PathBuf>, api: Option<String>) -> Result<StoreConfig> {
    let config = match config_path {
        Some(path) => StoreConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StoreConfig::load().context("Failed to load config")?,
    };

    let mut config = config
        .apply_env()
        .context("Invalid environment configuration")?;

    if let Some(api) = api {
        config = config.with_api_url(api);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let config = resolve_config(cli.config.as_ref(), cli.api)?;
    tracing::debug!("Resolved config: {:?}", config);

    if let CatalogCommand::Config = cli.command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let store = CharmStore::from_config(&config).context("Failed to create catalog client")?;
    cli.command.execute(&store).await
}
