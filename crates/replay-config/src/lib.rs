//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, BacktestSettings, DataSettings, StrategySettings};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables prefixed with `REPLAY` override file values, with
/// `__` separating sections: `REPLAY__BACKTEST__INITIAL_CAPITAL=5000000`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("REPLAY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_backtest::PnlRealization;
    use replay_monitor::LogFormat;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [backtest]
            start_date = "2024-01-01"
            end_date = "2024-06-30"
            initial_capital = 5000000.0
            commission_rate = 0.0005
            pnl_realization = "on_close"

            [strategy]
            name = "kimp_cash_carry"

            [strategy.params]
            entry_threshold = 0.04

            [data]
            path = "data/kimp.csv"
            symbols = ["BTC", "ETH"]
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.backtest.initial_capital, 5_000_000.0);
        assert_eq!(config.backtest.commission_rate, 0.0005);
        // Unset keys keep their defaults.
        assert_eq!(config.backtest.slippage_rate, 0.0005);
        assert_eq!(config.backtest.pnl_realization, PnlRealization::OnClose);
        assert_eq!(config.strategy.params["entry_threshold"], 0.04);
        assert_eq!(config.data.symbols, vec!["BTC", "ETH"]);
        assert_eq!(config.data.timeframe, "1m");

        let backtest = config.backtest.to_backtest_config().unwrap();
        assert_eq!(backtest.end_date.to_string(), "2024-06-30");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.strategy.name, "kimp_cash_carry");
        assert_eq!(config.backtest.initial_capital, 20_000_000.0);
        assert!(config.backtest.to_backtest_config().is_ok());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("[app]\nname = \"from-file\"\n");
        std::env::set_var("REPLAY__APP__ENVIRONMENT", "ci");

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.app.name, "from-file");
        assert_eq!(config.app.environment, "ci");

        std::env::remove_var("REPLAY__APP__ENVIRONMENT");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Path::new("/definitely/not/here.toml")).is_err());
    }

    #[test]
    fn test_invalid_backtest_settings() {
        let settings = BacktestSettings {
            initial_capital: -1.0,
            ..Default::default()
        };
        assert!(settings.to_backtest_config().is_err());

        let inverted = BacktestSettings {
            start_date: "2024-02-01".to_string(),
            end_date: "2024-01-01".to_string(),
            ..Default::default()
        };
        assert!(inverted.to_backtest_config().is_err());
    }

    #[test]
    fn test_renders_toml() {
        let rendered = AppConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[backtest]"));
        assert!(rendered.contains("kimp_cash_carry"));
    }
}
