//! Core data types for the replay system.

mod bar;
mod position;
mod signal;
mod timeframe;
mod trade;

pub use bar::{Bar, SeriesView, TimeSeries};
pub use position::{Position, PositionBook};
pub use signal::{MetadataValue, Signal, SignalAction};
pub use timeframe::Timeframe;
pub use trade::{Side, Trade};
