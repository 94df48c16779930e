//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{SeriesView, Signal, Trade};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// State of a strategy for monitoring and serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyState {
    /// Strategy name
    pub name: String,
    /// Number of views evaluated since the last reset
    pub bars_processed: usize,
    /// Number of signals generated
    pub signals_generated: usize,
    /// Current indicator values
    pub indicators: HashMap<String, f64>,
    /// Custom strategy-specific state
    pub custom: serde_json::Value,
}

/// Core strategy trait.
///
/// The engine owns nothing of a strategy except the `&mut` handle it is
/// given for a run. It calls [`reset`](Strategy::reset) once before the first
/// step, then [`generate_signal`](Strategy::generate_signal) once per step with
/// a view that ends at that step. Everything a strategy remembers between
/// calls (position flags, previous indicator values) lives in its own fields.
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Inspect history up to and including the current bar and optionally
    /// return a signal.
    ///
    /// # Arguments
    /// * `view` - Bars from the start of the backtest window through the
    ///   current step; `view.last()` is the current bar
    ///
    /// # Returns
    /// * `Ok(Some(signal))` if a trading action should be taken
    /// * `Ok(None)` if no action is needed
    /// * `Err(_)` if the step could not be evaluated; the engine records no
    ///   trade for this step and moves on
    fn generate_signal(&mut self, view: &SeriesView<'_>) -> Result<Option<Signal>, StrategyError>;

    /// Check the strategy's parameters.
    fn validate_params(&self) -> Result<(), StrategyError>;

    /// Called after a signal of this strategy was filled.
    fn on_fill(&mut self, _trade: &Trade) {}

    /// Called when `generate_signal` returned an error.
    fn on_error(&mut self, _error: &StrategyError) {}

    /// Reset the strategy state.
    ///
    /// This is called before every backtest run.
    fn reset(&mut self) {}

    /// Quantity currently held in `symbol`, as tracked by the strategy.
    fn position(&self, _symbol: &str) -> f64 {
        0.0
    }

    /// Get the current strategy state for monitoring.
    fn state(&self) -> StrategyState {
        StrategyState {
            name: self.name().to_string(),
            ..Default::default()
        }
    }

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bar, PositionBook, Side, SignalAction, TimeSeries, Timeframe};
    use chrono::Utc;

    struct TestStrategy {
        bars_seen: usize,
        errors: usize,
        book: PositionBook,
    }

    impl Strategy for TestStrategy {
        fn name(&self) -> &str {
            "test"
        }

        fn generate_signal(
            &mut self,
            view: &SeriesView<'_>,
        ) -> Result<Option<Signal>, StrategyError> {
            self.bars_seen += 1;
            let bar = view
                .last()
                .ok_or_else(|| StrategyError::Evaluation("empty view".into()))?;
            Ok(Some(
                Signal::new(bar.datetime(), SignalAction::Buy, "TEST", "sim", 0.5)
                    .with_price(bar.close().unwrap_or(0.0)),
            ))
        }

        fn validate_params(&self) -> Result<(), StrategyError> {
            Ok(())
        }

        fn on_fill(&mut self, trade: &Trade) {
            self.book.apply(trade);
        }

        fn on_error(&mut self, _error: &StrategyError) {
            self.errors += 1;
        }

        fn reset(&mut self) {
            self.bars_seen = 0;
            self.book.clear();
        }

        fn position(&self, symbol: &str) -> f64 {
            self.book.get(symbol)
        }
    }

    #[test]
    fn test_default_hooks_and_state() {
        let mut strategy = TestStrategy {
            bars_seen: 0,
            errors: 0,
            book: PositionBook::new(),
        };

        let series = TimeSeries::from_bars(
            "TEST",
            Timeframe::Daily,
            vec![Bar::ohlcv(0, 1.0, 1.0, 1.0, 10.0, 1.0)],
        )
        .unwrap();
        let signal = strategy.generate_signal(&series.view()).unwrap().unwrap();
        assert_eq!(signal.price, Some(10.0));

        strategy.on_fill(&Trade {
            timestamp: Utc::now(),
            symbol: "TEST".into(),
            side: Side::Buy,
            quantity: 2.0,
            price: 10.0,
            commission: 0.0,
            pnl: 0.0,
        });
        assert_eq!(strategy.position("TEST"), 2.0);

        let empty = TimeSeries::new("TEST", Timeframe::Daily);
        let err = strategy.generate_signal(&empty.view()).unwrap_err();
        strategy.on_error(&err);
        assert_eq!(strategy.errors, 1);

        strategy.reset();
        assert_eq!(strategy.position("TEST"), 0.0);
        assert_eq!(strategy.state().name, "test");
        assert_eq!(strategy.description(), "");
    }
}
