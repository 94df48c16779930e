//! Position tracking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Side, Trade};

/// A long position in a single symbol with a weighted-average entry.
///
/// Shorting is not modeled: a sell larger than the open quantity only closes
/// what is open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Units held
    pub quantity: f64,
    /// Average entry price
    pub avg_entry_price: f64,
    /// Realized profit/loss from closed portions
    pub realized_pnl: f64,
}

impl Position {
    /// Check if the position is flat (no units).
    pub fn is_flat(&self) -> bool {
        self.quantity <= 0.0
    }

    /// Apply a fill to the position.
    /// Returns the realized P&L if the position is being reduced.
    pub fn apply_fill(&mut self, side: Side, quantity: f64, price: f64) -> f64 {
        match side {
            Side::Buy => {
                let new_quantity = self.quantity + quantity;
                if new_quantity > 0.0 {
                    self.avg_entry_price =
                        (self.quantity * self.avg_entry_price + quantity * price) / new_quantity;
                }
                self.quantity = new_quantity;
                0.0
            }
            Side::Sell => {
                if self.is_flat() {
                    return 0.0;
                }
                let close_qty = quantity.min(self.quantity);
                let realized = close_qty * (price - self.avg_entry_price);
                self.quantity -= close_qty;
                if self.quantity <= 0.0 {
                    self.quantity = 0.0;
                    self.avg_entry_price = 0.0;
                }
                self.realized_pnl += realized;
                realized
            }
        }
    }
}

/// Signed per-symbol quantities built from fills.
///
/// Strategies embed one of these to answer position queries; buys add and
/// sells subtract.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: HashMap<String, f64>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fill.
    pub fn apply(&mut self, trade: &Trade) {
        *self.positions.entry(trade.symbol.clone()).or_insert(0.0) +=
            trade.side.sign() * trade.quantity;
    }

    /// Current quantity, 0 for unknown symbols.
    pub fn get(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
