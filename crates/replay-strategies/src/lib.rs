//! Strategy implementations.
//!
//! This crate provides:
//! - Kimchi-premium cash-and-carry arbitrage
//! - Moving Average Crossover
//! - A registry that builds strategies by name from JSON parameters

mod kimp;
mod ma_crossover;
mod registry;

pub use kimp::{KimpCashCarryStrategy, KimpConfig};
pub use ma_crossover::{MACrossoverConfig, MACrossoverStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
