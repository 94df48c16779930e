//! Logging setup.
//!
//! Console output is always on. A file sink is added when
//! [`LoggingOptions::file`] is set; it writes through a background thread,
//! so keep the returned [`WorkerGuard`] alive until the process exits or the
//! tail of the log is lost.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors raised while installing the subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("Cannot open log file: {0}")]
    File(#[from] InitError),

    #[error("Logging already initialized: {0}")]
    Init(#[from] TryInitError),

    #[error("Unknown {name}: {value}")]
    UnknownValue { name: &'static str, value: String },
}

/// Line format of every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::UnknownValue {
                name: "log format",
                value: s.to_string(),
            }),
        }
    }
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl FromStr for LogRotation {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(LogRotation::Daily),
            "hourly" => Ok(LogRotation::Hourly),
            "never" => Ok(LogRotation::Never),
            _ => Err(LoggingError::UnknownValue {
                name: "log rotation",
                value: s.to_string(),
            }),
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Filter directive, e.g. `info` or `replay_backtest=debug,info`
    pub level: String,
    pub format: LogFormat,
    /// Log file path; the file name is used as the prefix of rolled files
    pub file: Option<PathBuf>,
    pub rotation: LogRotation,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
            rotation: LogRotation::Daily,
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `options.level`.
pub fn setup_logging(options: &LoggingOptions) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&options.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(match options.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    });

    let mut guard = None;
    if let Some(path) = &options.file {
        let (writer, worker) = tracing_appender::non_blocking(file_appender(path, options.rotation)?);
        guard = Some(worker);

        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        layers.push(match options.format {
            LogFormat::Pretty => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        });
    }

    tracing_subscriber::registry().with(layers).with(filter).try_init()?;
    Ok(guard)
}

/// Rolling appender writing next to `path`, prefixed with its file name.
fn file_appender(path: &Path, rotation: LogRotation) -> Result<RollingFileAppender, InitError> {
    let (dir, prefix) = split_log_path(path);
    RollingFileAppender::builder()
        .rotation(rotation.into())
        .filename_prefix(prefix)
        .build(dir)
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "replay.log".to_string());
    (dir, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());

        assert_eq!("hourly".parse::<LogRotation>().unwrap(), LogRotation::Hourly);
        assert!("weekly".parse::<LogRotation>().is_err());
    }

    #[test]
    fn test_split_log_path() {
        let (dir, prefix) = split_log_path(Path::new("logs/replay.log"));
        assert_eq!(dir, PathBuf::from("logs"));
        assert_eq!(prefix, "replay.log");

        let (dir, prefix) = split_log_path(Path::new("replay.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(prefix, "replay.log");
    }

    #[test]
    fn test_setup_logging_once() {
        let dir = tempfile::tempdir().unwrap();
        let options = LoggingOptions {
            level: "debug".to_string(),
            file: Some(dir.path().join("replay.log")),
            rotation: LogRotation::Never,
            ..Default::default()
        };

        let guard = setup_logging(&options).unwrap();
        assert!(guard.is_some());
        tracing::info!("logging initialized");

        let second = setup_logging(&LoggingOptions::default());
        assert!(matches!(second, Err(LoggingError::Init(_))));
    }
}
