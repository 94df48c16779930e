//! Strategy replay CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, LogLevel};
use replay_config::{load_config, AppConfig};
use replay_monitor::{setup_logging, LogFormat, WorkerGuard};
use std::path::Path;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config,
        log_level,
        json_logs,
        command,
    } = Cli::parse();

    // Execute command
    match command {
        Commands::Backtest(args) => {
            let (app_config, _guard) = init(&config, log_level, json_logs)?;
            cli::commands::backtest::run(args, app_config).await
        }
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&config).await,
    }
}

/// Load configuration, apply logging flags and install the subscriber.
fn init(
    path: &Path,
    log_level: Option<LogLevel>,
    json_logs: bool,
) -> Result<(AppConfig, Option<WorkerGuard>)> {
    let found = path.exists();
    let mut config = if found {
        load_config(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(level) = log_level {
        config.logging.level = level.as_str().to_string();
    }
    if json_logs {
        config.logging.format = LogFormat::Json;
    }
    let guard = setup_logging(&config.logging).context("Failed to set up logging")?;

    if !found {
        warn!(path = %path.display(), "Configuration file not found, using defaults");
    }

    Ok((config, guard))
}
