//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "replay")]
#[command(author, version, about = "Replay trading strategies over historical data")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest
    Backtest(BacktestArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Every option left unset falls back to the configuration file.
#[derive(clap::Args, Default)]
pub struct BacktestArgs {
    /// Strategy to backtest
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Symbols to backtest (comma-separated), one independent run each
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// End date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<f64>,

    /// Commission rate as a fraction of traded value
    #[arg(long)]
    pub commission: Option<f64>,

    /// Slippage rate as a fraction of price
    #[arg(long)]
    pub slippage: Option<f64>,

    /// How trades realize pnl (deferred, on_close)
    #[arg(long)]
    pub pnl: Option<String>,

    /// Timeframe
    #[arg(short, long)]
    pub timeframe: Option<String>,

    /// Strategy parameters file (JSON or TOML), merged over the configured params
    #[arg(long)]
    pub strategy_config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save results to file (JSON)
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Directory for per-symbol equity and trade CSV files
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Data file or directory of <SYMBOL>.csv files
    #[arg(long)]
    pub data: Option<PathBuf>,
}
