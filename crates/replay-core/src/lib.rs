//! Core types and traits for strategy replay.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, TimeSeries, SeriesView)
//! - Trading signals, trades and positions
//! - Core traits for strategies and data sources

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ReplayError, ReplayResult};
pub use traits::*;
pub use types::*;
