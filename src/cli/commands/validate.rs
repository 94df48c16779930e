//! Validate configuration command.

use anyhow::{Context, Result};
use replay_config::load_config;
use replay_strategies::StrategyRegistry;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let backtest = config
        .backtest
        .to_backtest_config()
        .context("Invalid [backtest] section")?;
    StrategyRegistry::new()
        .create(&config.strategy.name, config.strategy.params.clone())
        .context("Invalid [strategy] section")?;
    config
        .data
        .timeframe
        .parse::<replay_core::types::Timeframe>()
        .context("Invalid [data] timeframe")?;

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Window: {} ~ {}", backtest.start_date, backtest.end_date);
    println!("Initial capital: {}", replay_backtest::format_currency(backtest.initial_capital));
    println!("Commission: {:.4}%", backtest.commission_rate * 100.0);
    println!("Slippage: {:.4}%", backtest.slippage_rate * 100.0);
    println!("Strategy: {}", config.strategy.name);
    println!("Symbols: {}", config.data.symbols.join(", "));
    println!();
    println!("Effective configuration:");
    println!("{}", config.to_toml()?);

    Ok(())
}
