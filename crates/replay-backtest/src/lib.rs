//! Backtesting engine.
//!
//! [`BacktestEngine`] replays a [`Strategy`](replay_core::Strategy) over a
//! historical series one step at a time, fills its signals through an
//! [`ExecutionModel`] and scores the run with [`PerformanceMetrics`].

mod config;
mod engine;
mod execution;
mod metrics;
mod report;

pub use config::{parse_date, BacktestConfig, PnlRealization};
pub use engine::BacktestEngine;
pub use execution::{ExecutionModel, ProportionalCostModel};
pub use metrics::{
    percentile, EquityCurve, EquityPoint, MetricsSummary, PerformanceMetrics,
    DEFAULT_RISK_FREE_RATE, TRADING_PERIODS_PER_YEAR,
};
pub use report::{format_currency, BacktestResult};
