//! Strategy registry for dynamic strategy loading.

use crate::{KimpCashCarryStrategy, KimpConfig, MACrossoverConfig, MACrossoverStrategy};
use replay_core::{error::StrategyError, traits::Strategy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for available strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = BTreeMap::new();

        strategies.insert(
            "kimp_cash_carry".to_string(),
            StrategyInfo {
                name: "kimp_cash_carry".to_string(),
                description: "Kimchi-premium cash-and-carry: long domestic spot, short offshore perpetual"
                    .to_string(),
                default_config: to_json(&KimpConfig::default()),
            },
        );

        strategies.insert(
            "ma_crossover".to_string(),
            StrategyInfo {
                name: "ma_crossover".to_string(),
                description: "Generates signals based on fast/slow moving average crossovers"
                    .to_string(),
                default_config: to_json(&MACrossoverConfig::default()),
            },
        );

        Self { strategies }
    }

    /// List all available strategies, ordered by name.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Get all strategy names.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Create a strategy instance.
    ///
    /// `params` is a JSON object whose keys override the strategy's defaults;
    /// `null` means "all defaults".
    pub fn create(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        let merged = merge_params(&info.default_config, params)?;

        match name {
            "kimp_cash_carry" => Ok(Box::new(KimpCashCarryStrategy::new(parse(merged)?)?)),
            "ma_crossover" => Ok(Box::new(MACrossoverStrategy::new(parse(merged)?)?)),
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn Strategy>, StrategyError> {
        self.create(name, serde_json::Value::Null)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(config: &T) -> serde_json::Value {
    serde_json::to_value(config).unwrap_or(serde_json::Value::Null)
}

fn parse<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, StrategyError> {
    serde_json::from_value(value).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

fn merge_params(
    defaults: &serde_json::Value,
    params: serde_json::Value,
) -> Result<serde_json::Value, StrategyError> {
    let mut merged = defaults.clone();
    match params {
        serde_json::Value::Null => {}
        serde_json::Value::Object(overrides) => {
            if let serde_json::Value::Object(base) = &mut merged {
                base.extend(overrides);
            }
        }
        other => {
            return Err(StrategyError::InvalidConfig(format!(
                "Strategy params must be an object, got {}",
                other
            )))
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_list() {
        let registry = StrategyRegistry::new();
        let names: Vec<_> = registry.list().iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["kimp_cash_carry", "ma_crossover"]);
        assert_eq!(registry.names(), names);
    }

    #[test]
    fn test_registry_get() {
        let registry = StrategyRegistry::new();

        let info = registry.get("kimp_cash_carry").unwrap();
        assert_eq!(info.default_config["entry_threshold"], 0.03);
        assert!(registry.exists("ma_crossover"));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_create_default() {
        let registry = StrategyRegistry::new();

        let strategy = registry.create_default("kimp_cash_carry").unwrap();
        assert_eq!(strategy.name(), "kimp_cash_carry");
        assert!(strategy.validate_params().is_ok());
    }

    #[test]
    fn test_create_merges_over_defaults() {
        let registry = StrategyRegistry::new();

        let strategy = registry
            .create("kimp_cash_carry", json!({ "entry_threshold": 0.05 }))
            .unwrap();
        let state = strategy.state();
        assert_eq!(state.custom["entry_threshold"], 0.05);
        assert_eq!(state.custom["exit_threshold"], 0.01);

        let ma = registry
            .create("ma_crossover", json!({ "fast_period": 10, "slow_period": 30 }))
            .unwrap();
        assert_eq!(ma.state().custom["slow_period"], 30);
    }

    #[test]
    fn test_create_rejects_invalid_params() {
        let registry = StrategyRegistry::new();

        let inverted = registry.create(
            "kimp_cash_carry",
            json!({ "entry_threshold": 0.01, "exit_threshold": 0.03 }),
        );
        assert!(matches!(inverted, Err(StrategyError::InvalidConfig(_))));

        let wrong_type = registry.create("ma_crossover", json!({ "fast_period": "fast" }));
        assert!(matches!(wrong_type, Err(StrategyError::InvalidConfig(_))));

        let not_object = registry.create("ma_crossover", json!([1, 2]));
        assert!(matches!(not_object, Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn test_create_unknown_strategy() {
        let registry = StrategyRegistry::new();

        let result = registry.create_default("unknown");
        assert!(matches!(result, Err(StrategyError::NotFound(_))));
    }
}
