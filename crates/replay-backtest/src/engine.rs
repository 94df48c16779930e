//! Backtesting engine.

use replay_core::error::ConfigError;
use replay_core::{Position, Strategy, TimeSeries, Trade};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{BacktestConfig, PnlRealization};
use crate::execution::{ExecutionModel, ProportionalCostModel};
use crate::metrics::{EquityCurve, PerformanceMetrics};
use crate::report::BacktestResult;

/// Replays one strategy over one series.
///
/// A run is strictly sequential: step `t + 1` is evaluated only after step
/// `t` has been executed and its capital recorded. Independent engines share
/// nothing and can run on separate threads.
pub struct BacktestEngine {
    config: BacktestConfig,
    execution: Box<dyn ExecutionModel>,
    stop: Option<Arc<AtomicBool>>,
}

impl BacktestEngine {
    /// Create an engine that fills through [`ProportionalCostModel`].
    pub fn new(config: BacktestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let execution = Box::new(ProportionalCostModel::from_config(&config));
        Ok(Self {
            config,
            execution,
            stop: None,
        })
    }

    /// Replace the execution model.
    pub fn with_execution_model(mut self, model: impl ExecutionModel + 'static) -> Self {
        self.execution = Box::new(model);
        self
    }

    /// Halt the run at the next step boundary once `flag` is set.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    fn should_stop(&self) -> bool {
        self.stop
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Run a backtest.
    ///
    /// The strategy is reset, then asked for a signal at every step after the
    /// first bar of the configured window, each time with a view that ends at
    /// that step. The equity curve holds the initial capital followed by the
    /// capital after each evaluated step, so a full run yields one point per
    /// bar in the window.
    pub fn run(&self, strategy: &mut dyn Strategy, series: &TimeSeries) -> BacktestResult {
        strategy.reset();

        let window = series.window(self.config.start_date, self.config.end_date);
        info!(
            symbol = %series.symbol,
            strategy = strategy.name(),
            bars = window.len(),
            start = %self.config.start_date,
            end = %self.config.end_date,
            "Starting backtest"
        );

        let mut capital = self.config.initial_capital;
        let mut values: Vec<f64> = Vec::with_capacity(window.len());
        let mut trades: Vec<Trade> = Vec::new();
        let mut position = Position::default();
        let mut halted = false;

        if !window.is_empty() {
            values.push(capital);
        }

        for t in 1..window.len() {
            if self.should_stop() {
                warn!(step = t, "Backtest halted");
                halted = true;
                break;
            }

            let view = window.as_of(t);
            match strategy.generate_signal(&view) {
                Ok(Some(signal)) => {
                    if let Some(mut trade) = self.execution.execute(&signal, capital) {
                        if self.config.pnl_realization == PnlRealization::OnClose {
                            trade.pnl = position.apply_fill(trade.side, trade.quantity, trade.price);
                        }
                        capital += trade.net_cash_effect();

                        debug!(
                            timestamp = %trade.timestamp,
                            side = ?trade.side,
                            quantity = trade.quantity,
                            price = trade.price,
                            commission = trade.commission,
                            pnl = trade.pnl,
                            capital,
                            "Trade executed"
                        );

                        strategy.on_fill(&trade);
                        trades.push(trade);
                    } else {
                        debug!(step = t, action = %signal.action, "Signal not executable");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(step = t, error = %e, "Strategy failed to evaluate step");
                    strategy.on_error(&e);
                }
            }

            values.push(capital);
        }

        let equity_curve = EquityCurve::from_parts(window.iter().map(|b| b.datetime()), values);
        let metrics = PerformanceMetrics::new(&equity_curve, &trades)
            .with_risk_free_rate(self.config.risk_free_rate)
            .summary();

        info!(
            symbol = %series.symbol,
            trades = trades.len(),
            total_return = metrics.total_return,
            sharpe = metrics.sharpe_ratio,
            halted,
            "Backtest complete"
        );

        BacktestResult {
            config: self.config.clone(),
            symbol: series.symbol.clone(),
            strategy: strategy.name().to_string(),
            metrics,
            trades,
            equity_curve,
            halted,
        }
    }
}
