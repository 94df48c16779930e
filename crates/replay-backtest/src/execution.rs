//! Order execution models.

use replay_core::{Side, Signal, Trade};

use crate::config::BacktestConfig;

/// Turns a signal into a simulated fill.
pub trait ExecutionModel: Send + Sync {
    /// Fill `signal` against the current `capital`.
    ///
    /// Returns `None` when the signal cannot be executed; the engine then
    /// records no trade for the step.
    fn execute(&self, signal: &Signal, capital: f64) -> Option<Trade>;
}

/// Fills at the signal price moved against the trader by a fixed slippage
/// rate, and charges commission proportional to traded value.
///
/// * fill price: `price * (1 + slippage)` for buys, `price * (1 - slippage)` for sells
/// * quantity: `signal.quantity * capital / fill_price`
/// * commission: `quantity * fill_price * commission_rate`
///
/// Trades leave this model with zero pnl.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalCostModel {
    pub slippage_rate: f64,
    pub commission_rate: f64,
}

impl ProportionalCostModel {
    pub fn new(slippage_rate: f64, commission_rate: f64) -> Self {
        Self {
            slippage_rate,
            commission_rate,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(config.slippage_rate, config.commission_rate)
    }

    /// Price after slippage for the given side.
    pub fn fill_price(&self, side: Side, price: f64) -> f64 {
        match side {
            Side::Buy => price * (1.0 + self.slippage_rate),
            Side::Sell => price * (1.0 - self.slippage_rate),
        }
    }
}

impl ExecutionModel for ProportionalCostModel {
    fn execute(&self, signal: &Signal, capital: f64) -> Option<Trade> {
        let price = signal.executable_price()?;
        // HOLD has no side: it never fills and pays no commission, even with a price.
        let side = signal.action.side()?;

        let fill_price = self.fill_price(side, price);
        // A sell slippage of 100% or more leaves nothing to fill at.
        if !(fill_price.is_finite() && fill_price > 0.0) {
            return None;
        }

        let quantity = signal.quantity * capital / fill_price;
        let commission = quantity * fill_price * self.commission_rate;

        Some(Trade {
            timestamp: signal.timestamp,
            symbol: signal.symbol.clone(),
            side,
            quantity,
            price: fill_price,
            commission,
            pnl: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Utc;
    use replay_core::SignalAction;

    fn signal(action: SignalAction, price: Option<f64>, fraction: f64) -> Signal {
        let mut s = Signal::new(Utc::now(), action, "BTC", "upbit,binance", fraction);
        s.price = price;
        s
    }

    #[test]
    fn test_buy_fill() {
        let model = ProportionalCostModel::new(0.0005, 0.001);
        let capital = 20_000_000.0;
        let price = 136_500_000.0;

        let trade = model
            .execute(&signal(SignalAction::Buy, Some(price), 1.0), capital)
            .unwrap();

        assert_eq!(trade.side, Side::Buy);
        assert_relative_eq!(trade.price, price * 1.0005, max_relative = 1e-12);
        assert_relative_eq!(trade.quantity, capital / (price * 1.0005), max_relative = 1e-12);
        assert_relative_eq!(trade.commission, capital * 0.001, max_relative = 1e-12);
        assert_eq!(trade.pnl, 0.0);
    }

    #[test]
    fn test_sell_fill_and_fraction() {
        let model = ProportionalCostModel::new(0.01, 0.002);
        let trade = model
            .execute(&signal(SignalAction::Sell, Some(100.0), 0.5), 10_000.0)
            .unwrap();

        assert_eq!(trade.side, Side::Sell);
        assert_relative_eq!(trade.price, 99.0, max_relative = 1e-12);
        assert_relative_eq!(trade.quantity, 5_000.0 / 99.0, max_relative = 1e-12);
        assert_relative_eq!(trade.commission, 5_000.0 * 0.002, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_missing_or_non_positive_price() {
        let model = ProportionalCostModel::new(0.0005, 0.001);
        assert!(model.execute(&signal(SignalAction::Buy, None, 1.0), 1_000.0).is_none());
        assert!(model.execute(&signal(SignalAction::Buy, Some(0.0), 1.0), 1_000.0).is_none());
        assert!(model.execute(&signal(SignalAction::Sell, Some(-3.0), 1.0), 1_000.0).is_none());
    }

    #[test]
    fn test_priced_hold_is_never_filled_as_a_sell() {
        let model = ProportionalCostModel::new(0.0005, 0.001);
        assert!(model.execute(&signal(SignalAction::Hold, Some(10.0), 1.0), 1_000.0).is_none());
    }

    #[test]
    fn test_total_sell_slippage_is_not_executed() {
        let model = ProportionalCostModel::new(1.0, 0.0);
        assert!(model.execute(&signal(SignalAction::Sell, Some(10.0), 1.0), 1_000.0).is_none());
    }

    #[test]
    fn test_zero_costs() {
        let model = ProportionalCostModel::from_config(
            &BacktestConfig::default()
                .with_slippage_rate(0.0)
                .with_commission_rate(0.0),
        );
        let trade = model
            .execute(&signal(SignalAction::Buy, Some(50.0), 1.0), 1_000.0)
            .unwrap();
        assert_eq!(trade.price, 50.0);
        assert_eq!(trade.quantity, 20.0);
        assert_eq!(trade.commission, 0.0);
    }
}
