//! Backtest command implementation.

use anyhow::{bail, Context, Result};
use replay_backtest::{BacktestConfig, BacktestEngine, BacktestResult};
use replay_config::AppConfig;
use replay_core::types::Timeframe;
use replay_strategies::StrategyRegistry;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, mut config: AppConfig) -> Result<()> {
    apply_overrides(&args, &mut config)?;

    let backtest_config = config
        .backtest
        .to_backtest_config()
        .context("Invalid backtest configuration")?;
    let timeframe: Timeframe = config
        .data
        .timeframe
        .parse()
        .context("Invalid timeframe")?;

    // Fail on bad strategy params before touching any data
    let registry = StrategyRegistry::new();
    let strategy_name = config.strategy.name.clone();
    let params = config.strategy.params.clone();
    registry
        .create(&strategy_name, params.clone())
        .with_context(|| format!("Failed to create strategy '{}'", strategy_name))?;

    let data_path = match &args.data {
        Some(path) => path.clone(),
        None => match &config.data.path {
            Some(path) => PathBuf::from(path),
            None => bail!("Please provide a data file or directory with --data (e.g. --data ./data)"),
        },
    };
    let symbols = config.data.symbols.clone();
    if symbols.is_empty() {
        bail!("No symbols to backtest");
    }

    info!(
        strategy = %strategy_name,
        symbols = ?symbols,
        %timeframe,
        "Starting backtest"
    );

    let stop = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&stop));

    // One independent run per symbol
    let mut handles = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        let series = replay_data::load_csv(
            &data_path,
            symbol,
            timeframe,
            backtest_config.start_date,
            backtest_config.end_date,
        )
        .await
        .with_context(|| format!("Failed to load data for {} from {}", symbol, data_path.display()))?;

        let mut strategy = registry.create(&strategy_name, params.clone())?;
        let engine = BacktestEngine::new(backtest_config.clone())?.with_stop_flag(Arc::clone(&stop));

        handles.push(tokio::task::spawn_blocking(move || {
            engine.run(strategy.as_mut(), &series)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("Backtest task failed")?);
    }

    if results.iter().any(|r| r.halted) {
        warn!("Backtest interrupted; results cover the completed steps only");
    }

    report(&results, args.output)?;

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, serde_json::to_string_pretty(&results)?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!(path = %save_path.display(), "Results saved");
    }

    if let Some(dir) = &args.export_dir {
        export_csv(&results, dir)?;
    }

    Ok(())
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(args: &BacktestArgs, config: &mut AppConfig) -> Result<()> {
    let backtest = &mut config.backtest;
    if let Some(start) = &args.start {
        backtest.start_date = start.clone();
    }
    if let Some(end) = &args.end {
        backtest.end_date = end.clone();
    }
    if let Some(capital) = args.capital {
        backtest.initial_capital = capital;
    }
    if let Some(rate) = args.commission {
        backtest.commission_rate = rate;
    }
    if let Some(rate) = args.slippage {
        backtest.slippage_rate = rate;
    }
    if let Some(mode) = &args.pnl {
        backtest.pnl_realization = mode.parse()?;
    }

    if let Some(name) = &args.strategy {
        // Params in the file belong to the configured strategy
        if *name != config.strategy.name {
            config.strategy.params = serde_json::Value::Null;
        }
        config.strategy.name = name.clone();
    }
    if let Some(path) = &args.strategy_config {
        let overrides = read_params(path)?;
        match (&mut config.strategy.params, overrides) {
            (serde_json::Value::Object(base), serde_json::Value::Object(extra)) => base.extend(extra),
            (params, extra) => *params = extra,
        }
    }

    if !args.symbols.is_empty() {
        config.data.symbols = args.symbols.clone();
    }
    if let Some(timeframe) = &args.timeframe {
        config.data.timeframe = timeframe.clone();
    }
    Ok(())
}

fn read_params(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let params = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(params)
}

fn spawn_interrupt_handler(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping at the next step");
            stop.store(true, Ordering::Relaxed);
        }
    });
}

fn report(results: &[BacktestResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(results)?),
        OutputFormat::Text => {
            for result in results {
                println!("{}", result.summary());
            }
        }
    }
    Ok(())
}

fn export_csv(results: &[BacktestResult], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    for result in results {
        result
            .export_csv(dir)
            .with_context(|| format!("Failed to export {} to {}", result.symbol, dir.display()))?;
        info!(symbol = %result.symbol, dir = %dir.display(), "Exported CSV files");
    }
    Ok(())
}
