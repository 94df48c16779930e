//! Configuration structures.

use replay_backtest::{BacktestConfig, PnlRealization};
use replay_core::error::ConfigError;
use replay_monitor::LoggingOptions;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingOptions,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "replay".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// First day of the window, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day of the window (inclusive), `YYYY-MM-DD`
    pub end_date: String,
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub slippage_rate: f64,
    pub risk_free_rate: f64,
    pub pnl_realization: PnlRealization,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        let defaults = BacktestConfig::default();
        Self {
            start_date: "2023-01-01".to_string(),
            end_date: "2024-12-31".to_string(),
            initial_capital: defaults.initial_capital,
            commission_rate: defaults.commission_rate,
            slippage_rate: defaults.slippage_rate,
            risk_free_rate: defaults.risk_free_rate,
            pnl_realization: defaults.pnl_realization,
        }
    }
}

impl BacktestSettings {
    /// Build and validate the engine configuration.
    pub fn to_backtest_config(&self) -> Result<BacktestConfig, ConfigError> {
        let config = BacktestConfig::new(&self.start_date, &self.end_date)?
            .with_initial_capital(self.initial_capital)
            .with_commission_rate(self.commission_rate)
            .with_slippage_rate(self.slippage_rate)
            .with_risk_free_rate(self.risk_free_rate)
            .with_pnl_realization(self.pnl_realization);
        config.validate()?;
        Ok(config)
    }
}

/// Strategy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Registry name
    pub name: String,
    /// Parameters merged over the strategy's defaults
    pub params: serde_json::Value,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            name: "kimp_cash_carry".to_string(),
            params: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Historical data location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// CSV file, or directory of `<SYMBOL>.csv` files
    pub path: Option<String>,
    pub symbols: Vec<String>,
    pub timeframe: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: None,
            symbols: vec!["BTC".to_string()],
            timeframe: "1m".to_string(),
        }
    }
}
