//! Error types for the replay system.

use thiserror::Error;

/// Top-level replay error.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Backtest configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("Initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("{name} must be a non-negative number, got {value}")]
    NegativeRate { name: &'static str, value: f64 },

    #[error("Unknown setting value for {name}: {value}")]
    UnknownValue { name: &'static str, value: String },
}

/// Strategy-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Signal generation failed: {0}")]
    Evaluation(String),
}

/// Data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data file not found: {0}")]
    NotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Timestamps must be strictly increasing: {previous} followed by {next}")]
    Unordered { previous: i64, next: i64 },

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),
}

pub type ReplayResult<T> = Result<T, ReplayError>;
