//! Kimchi-premium cash-and-carry arbitrage.
//!
//! Holds spot on the domestic (KRW) exchange against a short perpetual on the
//! offshore (USDT) exchange while the domestic price trades at a premium.
//!
//! Each bar carries three columns:
//! - `upbit_price`: domestic spot price in KRW
//! - `binance_price`: offshore price in USDT
//! - `usd_krw`: exchange rate
//!
//! Enters when the premium reaches `entry_threshold` and exits once it falls
//! back to `exit_threshold`.

use replay_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig, StrategyState},
    types::{PositionBook, SeriesView, Signal, SignalAction, Trade},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const UPBIT_PRICE: &str = "upbit_price";
const BINANCE_PRICE: &str = "binance_price";
const USD_KRW: &str = "usd_krw";

/// Configuration for the kimp cash-and-carry strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KimpConfig {
    /// Premium at or above which a position is opened (0.03 = 3%)
    pub entry_threshold: f64,
    /// Premium at or below which the position is closed
    pub exit_threshold: f64,
    /// Fraction of capital committed per entry
    pub position_size: f64,
    pub symbol: String,
    pub exchange: String,
    /// Rate used when a bar has no `usd_krw` column
    pub default_usd_krw: f64,
}

impl Default for KimpConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 0.03,
            exit_threshold: 0.01,
            position_size: 1.0,
            symbol: "BTC".to_string(),
            exchange: "upbit,binance".to_string(),
            default_usd_krw: 1300.0,
        }
    }
}

impl StrategyConfig for KimpConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !(self.entry_threshold > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Entry threshold must be greater than 0".into(),
            ));
        }
        if !(self.exit_threshold >= 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Exit threshold must not be negative".into(),
            ));
        }
        if self.entry_threshold <= self.exit_threshold {
            return Err(StrategyError::InvalidConfig(
                "Entry threshold must be greater than exit threshold".into(),
            ));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(StrategyError::InvalidConfig(
                "Position size must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Kimchi-premium cash-and-carry strategy.
pub struct KimpCashCarryStrategy {
    config: KimpConfig,
    in_position: bool,
    book: PositionBook,
    last_kimp: Option<f64>,
    bars_processed: usize,
    signals_generated: usize,
}

impl KimpCashCarryStrategy {
    /// Create the strategy; fails if the configuration is invalid.
    pub fn new(config: KimpConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            in_position: false,
            book: PositionBook::new(),
            last_kimp: None,
            bars_processed: 0,
            signals_generated: 0,
        })
    }

    pub fn config(&self) -> &KimpConfig {
        &self.config
    }

    /// Whether an entry has been signalled and not yet exited.
    pub fn is_in_position(&self) -> bool {
        self.in_position
    }

    /// Premium of the domestic price over the offshore price converted to KRW.
    ///
    /// Returns 0 when the converted offshore price is 0.
    pub fn calculate_kimp(upbit_price: f64, binance_price: f64, usd_krw: f64) -> f64 {
        let binance_krw = binance_price * usd_krw;
        if binance_krw == 0.0 {
            return 0.0;
        }
        (upbit_price - binance_krw) / binance_krw
    }

    fn signal(
        &mut self,
        view: &SeriesView<'_>,
        action: SignalAction,
        prices: (f64, f64, f64),
        kimp: f64,
    ) -> Signal {
        let (upbit_price, binance_price, usd_krw) = prices;
        let timestamp = view.last().map(|b| b.datetime()).unwrap_or_default();

        let (kind, reason) = match action {
            SignalAction::Buy => (
                "ENTRY",
                format!(
                    "Kimp entry: {:.2}% >= {:.2}%",
                    kimp * 100.0,
                    self.config.entry_threshold * 100.0
                ),
            ),
            _ => (
                "EXIT",
                format!(
                    "Kimp exit: {:.2}% <= {:.2}%",
                    kimp * 100.0,
                    self.config.exit_threshold * 100.0
                ),
            ),
        };

        self.signals_generated += 1;
        debug!(kimp, action = %action, "Kimp signal");

        Signal::new(
            timestamp,
            action,
            self.config.symbol.clone(),
            self.config.exchange.clone(),
            self.config.position_size,
        )
        .with_price(upbit_price)
        .with_reason(reason)
        .with_metadata("kimp", kimp)
        .with_metadata(UPBIT_PRICE, upbit_price)
        .with_metadata(BINANCE_PRICE, binance_price)
        .with_metadata(USD_KRW, usd_krw)
        .with_metadata("type", kind)
    }
}

impl Strategy for KimpCashCarryStrategy {
    fn name(&self) -> &str {
        "kimp_cash_carry"
    }

    fn description(&self) -> &str {
        "Long domestic spot, short offshore perpetual while the kimchi premium is wide"
    }

    fn generate_signal(&mut self, view: &SeriesView<'_>) -> Result<Option<Signal>, StrategyError> {
        let Some(latest) = view.last() else {
            return Ok(None);
        };
        self.bars_processed += 1;

        let upbit_price = latest.get(UPBIT_PRICE).unwrap_or(0.0);
        let binance_price = latest.get(BINANCE_PRICE).unwrap_or(0.0);
        let usd_krw = latest.get(USD_KRW).unwrap_or(self.config.default_usd_krw);
        let prices = (upbit_price, binance_price, usd_krw);

        let kimp = Self::calculate_kimp(upbit_price, binance_price, usd_krw);
        self.last_kimp = Some(kimp);

        if !self.in_position {
            if kimp >= self.config.entry_threshold {
                self.in_position = true;
                return Ok(Some(self.signal(view, SignalAction::Buy, prices, kimp)));
            }
        } else if kimp <= self.config.exit_threshold {
            self.in_position = false;
            return Ok(Some(self.signal(view, SignalAction::Sell, prices, kimp)));
        }

        Ok(None)
    }

    fn validate_params(&self) -> Result<(), StrategyError> {
        self.config.validate()
    }

    fn on_fill(&mut self, trade: &Trade) {
        self.book.apply(trade);
    }

    fn reset(&mut self) {
        self.in_position = false;
        self.book.clear();
        self.last_kimp = None;
        self.bars_processed = 0;
        self.signals_generated = 0;
    }

    fn position(&self, symbol: &str) -> f64 {
        self.book.get(symbol)
    }

    fn state(&self) -> StrategyState {
        let mut indicators = std::collections::HashMap::new();
        if let Some(kimp) = self.last_kimp {
            indicators.insert("kimp".to_string(), kimp);
        }
        StrategyState {
            name: self.name().to_string(),
            bars_processed: self.bars_processed,
            signals_generated: self.signals_generated,
            indicators,
            custom: serde_json::json!({
                "in_position": self.in_position,
                "entry_threshold": self.config.entry_threshold,
                "exit_threshold": self.config.exit_threshold,
            }),
        }
    }
}
