//! Executed trades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the sign for position calculations (+1 for buy, -1 for sell).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A simulated fill, recorded once in the trade log and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    /// Units filled
    pub quantity: f64,
    /// Fill price after slippage
    pub price: f64,
    pub commission: f64,
    /// Realized profit/loss booked by this trade
    pub pnl: f64,
}

impl Trade {
    /// Change to capital caused by this trade.
    pub fn net_cash_effect(&self) -> f64 {
        self.pnl - self.commission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::Buy.sign(), 1.0);
        assert_eq!(Side::Sell.sign(), -1.0);
        assert_eq!(Side::Buy.to_string(), "BUY");
    }

    #[test]
    fn test_trade_cash_effect() {
        let trade = Trade {
            timestamp: Utc::now(),
            symbol: "BTC".to_string(),
            side: Side::Buy,
            quantity: 2.0,
            price: 50.0,
            commission: 0.1,
            pnl: 0.0,
        };

        assert!((trade.net_cash_effect() + 0.1).abs() < 1e-12);
    }
}
