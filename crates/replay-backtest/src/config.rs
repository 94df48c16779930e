//! Backtest configuration.

use chrono::NaiveDate;
use replay_core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::metrics::DEFAULT_RISK_FREE_RATE;

/// How trades book profit and loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PnlRealization {
    /// Every trade is recorded with zero pnl; capital only moves by
    /// commission.
    #[default]
    Deferred,
    /// Buys open or add to a long position at a weighted-average entry,
    /// sells realize `(fill - entry) * closed_quantity`.
    OnClose,
}

impl FromStr for PnlRealization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deferred" => Ok(PnlRealization::Deferred),
            "on_close" | "onclose" | "close" => Ok(PnlRealization::OnClose),
            _ => Err(ConfigError::UnknownValue {
                name: "pnl_realization",
                value: s.to_string(),
            }),
        }
    }
}

/// Backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// First day of the backtest window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the backtest window (inclusive)
    pub end_date: NaiveDate,
    /// Initial capital
    pub initial_capital: f64,
    /// Commission as a fraction of traded value
    pub commission_rate: f64,
    /// Adverse price move applied to every fill, as a fraction
    pub slippage_rate: f64,
    /// Annualized risk-free rate used by the Sharpe ratio
    pub risk_free_rate: f64,
    pub pnl_realization: PnlRealization,
}

impl Default for BacktestConfig {
    /// Unbounded window, 20,000,000 capital, 0.1% commission, 0.05% slippage.
    fn default() -> Self {
        Self {
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MAX,
            initial_capital: 20_000_000.0,
            commission_rate: 0.001,
            slippage_rate: 0.0005,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            pnl_realization: PnlRealization::Deferred,
        }
    }
}

impl BacktestConfig {
    /// Create a config for the inclusive `YYYY-MM-DD` date range with default costs.
    pub fn new(start_date: &str, end_date: &str) -> Result<Self, ConfigError> {
        let config = Self {
            start_date: parse_date(start_date)?,
            end_date: parse_date(end_date)?,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_initial_capital(mut self, capital: f64) -> Self {
        self.initial_capital = capital;
        self
    }

    pub fn with_commission_rate(mut self, rate: f64) -> Self {
        self.commission_rate = rate;
        self
    }

    pub fn with_slippage_rate(mut self, rate: f64) -> Self {
        self.slippage_rate = rate;
        self
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn with_pnl_realization(mut self, mode: PnlRealization) -> Self {
        self.pnl_realization = mode;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvertedRange {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        for (name, value) in [
            ("commission_rate", self.commission_rate),
            ("slippage_rate", self.slippage_rate),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeRate { name, value });
            }
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::NegativeRate {
                name: "risk_free_rate",
                value: self.risk_free_rate,
            });
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        value: value.to_string(),
    })
}
