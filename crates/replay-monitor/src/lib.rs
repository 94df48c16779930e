//! Logging and run monitoring.

mod logging;

pub use logging::{setup_logging, LogFormat, LogRotation, LoggingError, LoggingOptions};
pub use tracing_appender::non_blocking::WorkerGuard;
