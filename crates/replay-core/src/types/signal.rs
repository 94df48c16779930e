//! Trading signals emitted by strategies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Side;

/// What a strategy wants to do at the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    /// Order side for executable actions; `Hold` has none.
    pub fn side(&self) -> Option<Side> {
        match self {
            SignalAction::Buy => Some(Side::Buy),
            SignalAction::Sell => Some(Side::Sell),
            SignalAction::Hold => None,
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Primitive value stored in signal metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl MetadataValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

/// A trading instruction produced by a strategy for one step.
///
/// `quantity` is a *fraction of current capital* to allocate (1.0 = all of
/// it), not a unit count. The execution model converts it into units at the
/// fill price. A signal without a positive `price` is never executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub action: SignalAction,
    pub symbol: String,
    /// Exchange tag, e.g. `"upbit,binance"`
    pub exchange: String,
    /// Fraction of current capital to allocate
    pub quantity: f64,
    /// Reference price for the fill
    pub price: Option<f64>,
    /// Human readable reason
    pub reason: String,
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl Signal {
    pub fn new(
        timestamp: DateTime<Utc>,
        action: SignalAction,
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        quantity: f64,
    ) -> Self {
        Self {
            timestamp,
            action,
            symbol: symbol.into(),
            exchange: exchange.into(),
            quantity,
            price: None,
            reason: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Price usable for execution: present and strictly positive.
    pub fn executable_price(&self) -> Option<f64> {
        self.price.filter(|p| *p > 0.0)
    }
}
