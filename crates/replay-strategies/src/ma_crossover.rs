//! Moving Average Crossover Strategy.
//!
//! Buys when the fast SMA of closes crosses above the slow SMA while flat,
//! and sells when it crosses back below while long.

use replay_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig, StrategyState},
    types::{SeriesView, Signal, SignalAction},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the MA Crossover strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MACrossoverConfig {
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Fraction of capital committed per entry
    pub position_size: f64,
    /// Minimum crossover magnitude to generate signal (as a fraction)
    pub signal_threshold: f64,
}

impl Default for MACrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
            position_size: 1.0,
            signal_threshold: 0.0,
        }
    }
}

impl StrategyConfig for MACrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        if self.fast_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be greater than 0".into(),
            ));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(StrategyError::InvalidConfig(
                "Position size must be in (0, 1]".into(),
            ));
        }
        if self.signal_threshold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Signal threshold must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Moving Average Crossover Strategy.
pub struct MACrossoverStrategy {
    config: MACrossoverConfig,
    prev_fast: Option<f64>,
    prev_slow: Option<f64>,
    long: bool,
    bars_processed: usize,
    signals_generated: usize,
}

impl MACrossoverStrategy {
    /// Create a new MA Crossover strategy; fails if the configuration is invalid.
    pub fn new(config: MACrossoverConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            prev_fast: None,
            prev_slow: None,
            long: false,
            bars_processed: 0,
            signals_generated: 0,
        })
    }

    /// Mean of the last `period` values, if there are that many.
    fn sma(values: &[f64], period: usize) -> Option<f64> {
        if period == 0 || values.len() < period {
            return None;
        }
        let tail = &values[values.len() - period..];
        Some(tail.iter().sum::<f64>() / period as f64)
    }
}

impl Strategy for MACrossoverStrategy {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn description(&self) -> &str {
        "Generates signals based on fast/slow simple moving average crossovers"
    }

    fn generate_signal(&mut self, view: &SeriesView<'_>) -> Result<Option<Signal>, StrategyError> {
        self.bars_processed += 1;

        let closes = view.closes();
        let (Some(fast), Some(slow)) = (
            Self::sma(&closes, self.config.fast_period),
            Self::sma(&closes, self.config.slow_period),
        ) else {
            return Ok(None);
        };

        let bar = view
            .last()
            .ok_or_else(|| StrategyError::Evaluation("empty view".into()))?;
        let price = bar
            .close()
            .ok_or_else(|| StrategyError::Evaluation("bar has no close".into()))?;

        let magnitude = if slow != 0.0 {
            ((fast - slow) / slow).abs()
        } else {
            0.0
        };

        let action = match (self.prev_fast, self.prev_slow) {
            (Some(prev_f), Some(prev_s)) if magnitude >= self.config.signal_threshold => {
                if !self.long && prev_f <= prev_s && fast > slow {
                    Some(SignalAction::Buy)
                } else if self.long && prev_f >= prev_s && fast < slow {
                    Some(SignalAction::Sell)
                } else {
                    None
                }
            }
            _ => None,
        };

        self.prev_fast = Some(fast);
        self.prev_slow = Some(slow);

        let Some(action) = action else {
            return Ok(None);
        };

        self.long = action == SignalAction::Buy;
        self.signals_generated += 1;

        let direction = if action == SignalAction::Buy { "above" } else { "below" };
        debug!(fast, slow, action = %action, "MA crossover");

        Ok(Some(
            Signal::new(bar.datetime(), action, view.symbol(), "sim", self.config.position_size)
                .with_price(price)
                .with_reason(format!(
                    "Fast MA ({:.2}) crossed {} slow MA ({:.2})",
                    fast, direction, slow
                ))
                .with_metadata("fast_ma", fast)
                .with_metadata("slow_ma", slow)
                .with_metadata("crossover_magnitude", magnitude),
        ))
    }

    fn validate_params(&self) -> Result<(), StrategyError> {
        self.config.validate()
    }

    fn reset(&mut self) {
        self.prev_fast = None;
        self.prev_slow = None;
        self.long = false;
        self.bars_processed = 0;
        self.signals_generated = 0;
    }

    fn state(&self) -> StrategyState {
        StrategyState {
            name: self.name().to_string(),
            bars_processed: self.bars_processed,
            signals_generated: self.signals_generated,
            indicators: [
                ("fast_ma".to_string(), self.prev_fast.unwrap_or(0.0)),
                ("slow_ma".to_string(), self.prev_slow.unwrap_or(0.0)),
            ]
            .into_iter()
            .collect(),
            custom: serde_json::json!({
                "fast_period": self.config.fast_period,
                "slow_period": self.config.slow_period,
                "long": self.long,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::types::{Bar, TimeSeries, Timeframe};

    fn create_test_series(prices: &[f64]) -> TimeSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Bar::ohlcv(i as i64 * 86_400_000, p, p + 1.0, p - 1.0, p, 1000.0))
            .collect();
        TimeSeries::from_bars("TEST", Timeframe::Daily, bars).unwrap()
    }

    fn replay(strategy: &mut MACrossoverStrategy, series: &TimeSeries) -> Vec<Signal> {
        let view = series.view();
        (0..series.len())
            .filter_map(|i| strategy.generate_signal(&view.as_of(i)).unwrap())
            .collect()
    }

    fn fast_config() -> MACrossoverConfig {
        MACrossoverConfig {
            fast_period: 3,
            slow_period: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(MACrossoverConfig::default().validate().is_ok());

        let inverted = MACrossoverConfig {
            fast_period: 30,
            slow_period: 20,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let zero = MACrossoverConfig {
            fast_period: 0,
            ..Default::default()
        };
        assert!(MACrossoverStrategy::new(zero).is_err());

        let oversized = MACrossoverConfig {
            position_size: 2.0,
            ..Default::default()
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_bullish_then_bearish_crossover() {
        let mut strategy = MACrossoverStrategy::new(fast_config()).unwrap();
        let prices = [
            100.0, 99.0, 98.0, 97.0, 96.0, // Downtrend
            97.0, 99.0, 102.0, 105.0, 108.0, // Uptrend
            104.0, 99.0, 94.0, 90.0, 86.0, // Downtrend again
        ];
        let signals = replay(&mut strategy, &create_test_series(&prices));

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].action, SignalAction::Buy);
        assert_eq!(signals[1].action, SignalAction::Sell);
        assert!(signals[0].timestamp < signals[1].timestamp);
        assert!(signals[0].metadata["fast_ma"].as_f64().unwrap() > signals[0].metadata["slow_ma"].as_f64().unwrap());
    }

    #[test]
    fn test_no_sell_while_flat() {
        let mut strategy = MACrossoverStrategy::new(fast_config()).unwrap();
        // Straight decline: fast stays below slow, nothing to sell
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert!(replay(&mut strategy, &create_test_series(&prices)).is_empty());
    }

    #[test]
    fn test_warmup_returns_none() {
        let mut strategy = MACrossoverStrategy::new(fast_config()).unwrap();
        let series = create_test_series(&[100.0, 101.0, 102.0]);
        assert!(replay(&mut strategy, &series).is_empty());
        assert!(strategy.prev_fast.is_none());
    }

    #[test]
    fn test_reset() {
        let mut strategy = MACrossoverStrategy::new(fast_config()).unwrap();
        let series = create_test_series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        strategy.generate_signal(&series.view()).unwrap();

        assert!(strategy.prev_fast.is_some());
        assert!(strategy.bars_processed > 0);

        strategy.reset();

        assert!(strategy.prev_fast.is_none());
        assert!(!strategy.long);
        assert_eq!(strategy.bars_processed, 0);
    }
}
