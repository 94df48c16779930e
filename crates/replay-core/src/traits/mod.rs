//! Core traits for the replay system.

mod data_source;
mod strategy;

pub use data_source::DataSource;
pub use strategy::{Strategy, StrategyConfig, StrategyState};
