//! Backtest result and report generation.

use replay_core::{ReplayError, ReplayResult, Trade};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::BacktestConfig;
use crate::metrics::{EquityCurve, MetricsSummary};

/// Complete outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Configuration used
    pub config: BacktestConfig,
    pub symbol: String,
    /// Name of the strategy that produced the trades
    pub strategy: String,
    pub metrics: MetricsSummary,
    /// Every executed trade, in execution order
    pub trades: Vec<Trade>,
    pub equity_curve: EquityCurve,
    /// The run was stopped before the end of the window
    pub halted: bool,
}

impl BacktestResult {
    /// Capital at the end of the run, or the initial capital if nothing ran.
    pub fn final_capital(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.config.initial_capital)
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let m = &self.metrics;
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                      BACKTEST RESULT                      \n");
        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!("  Symbol:              {}\n", self.symbol));
        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        s.push_str(&format!(
            "  Period:              {} ~ {}\n",
            self.config.start_date, self.config.end_date
        ));
        s.push_str(&format!(
            "  Initial Capital:     {}\n",
            format_currency(self.config.initial_capital)
        ));
        s.push_str(&format!(
            "  Final Capital:       {}\n",
            format_currency(self.final_capital())
        ));
        if self.halted {
            s.push_str("  Status:              halted before end of window\n");
        }
        s.push('\n');

        s.push_str("RETURNS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total Return:        {}\n", format_percent(m.total_return)));
        s.push_str(&format!("  CAGR:                {}\n", format_percent(m.cagr)));
        s.push('\n');

        s.push_str("RISK\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Sharpe Ratio:        {:.2}\n", m.sharpe_ratio));
        s.push_str(&format!("  Max Drawdown:        {}\n", format_percent(m.max_drawdown)));
        s.push_str(&format!("  Volatility:          {}\n", format_percent(m.volatility)));
        s.push_str(&format!("  VaR (95%):           {}\n", format_percent(m.var_95)));
        s.push('\n');

        s.push_str("TRADES\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total Trades:        {}\n", m.total_trades));
        s.push_str(&format!("  Win Rate:            {}\n", format_percent(m.win_rate)));
        s.push_str(&format!("  Profit Factor:       {:.2}\n", m.profit_factor));
        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    ///
    /// Non-finite metrics (an infinite profit factor) are written as `null`.
    pub fn to_json(&self) -> ReplayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReplayError::Serialization(e.to_string()))
    }

    /// Export the equity curve as CSV with `timestamp,equity` columns.
    pub fn equity_to_csv(&self) -> ReplayResult<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for point in self.equity_curve.points() {
            wtr.serialize(point).map_err(csv_error)?;
        }
        into_string(wtr)
    }

    /// Export the trade log as CSV.
    pub fn trades_to_csv(&self) -> ReplayResult<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for trade in &self.trades {
            wtr.serialize(trade).map_err(csv_error)?;
        }
        into_string(wtr)
    }

    /// Write `<SYMBOL>_equity.csv` and `<SYMBOL>_trades.csv` into `dir`,
    /// creating it if needed. Returns the written paths.
    pub fn export_csv(&self, dir: &Path) -> ReplayResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let equity = dir.join(format!("{}_equity.csv", self.symbol));
        std::fs::write(&equity, self.equity_to_csv()?)?;

        let trades = dir.join(format!("{}_trades.csv", self.symbol));
        std::fs::write(&trades, self.trades_to_csv()?)?;

        Ok(vec![equity, trades])
    }
}

fn csv_error(e: csv::Error) -> ReplayError {
    ReplayError::Serialization(e.to_string())
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> ReplayResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ReplayError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReplayError::Serialization(e.to_string()))
}

fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Format an amount rounded to whole units with thousands separators.
///
/// `format_currency(20_000_000.0) == "20,000,000"`
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0.0 && rounded != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
