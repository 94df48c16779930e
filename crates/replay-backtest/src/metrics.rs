//! Performance metrics.
//!
//! Every metric returns a fixed sentinel on degenerate input (too few points,
//! zero variance, zero elapsed time, no losing trades) instead of failing:
//!
//! | metric | sentinel |
//! |---|---|
//! | total return | 0 with fewer than 2 equity points |
//! | CAGR | 0 with fewer than 2 points or no elapsed days, -1 on total loss |
//! | Sharpe | 0 with fewer than 2 returns or zero deviation |
//! | max drawdown | 0 with fewer than 2 points |
//! | win rate | 0 without trades |
//! | profit factor | 0 without trades or without gains, +inf without losses |
//! | volatility, VaR | 0 with fewer than 2 returns |
//!
//! Standard deviations use the sample (N-1) denominator and percentiles use
//! linear interpolation between closest ranks.

use chrono::{DateTime, Utc};
use replay_core::Trade;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Periods used to annualize per-step statistics.
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

/// Annualized risk-free rate used when none is configured.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;

const DAYS_PER_YEAR: f64 = 365.0;

/// Capital at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Capital over time, ordered by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair timestamps with values; the shorter input decides the length.
    pub fn from_parts(
        timestamps: impl IntoIterator<Item = DateTime<Utc>>,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            points: timestamps
                .into_iter()
                .zip(values)
                .map(|(timestamp, equity)| EquityPoint { timestamp, equity })
                .collect(),
        }
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, equity: f64) {
        self.points.push(EquityPoint { timestamp, equity });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&EquityPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    /// Percentage change between consecutive values, first point dropped.
    ///
    /// Steps that come out as NaN (a zero followed by a zero) are dropped.
    pub fn returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
            .filter(|r| !r.is_nan())
            .collect()
    }
}

/// Linear-interpolation percentile of `values`, `p` in `[0, 100]`.
///
/// Returns 0 for an empty input.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Flat record of every computed metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Annualized volatility of per-step returns
    pub volatility: f64,
    /// One-step Value at Risk at 95% confidence
    pub var_95: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: usize,
}

/// Derives return and risk statistics from an equity curve and trade log.
pub struct PerformanceMetrics<'a> {
    equity: &'a EquityCurve,
    trades: &'a [Trade],
    returns: Vec<f64>,
    risk_free_rate: f64,
}

impl<'a> PerformanceMetrics<'a> {
    pub fn new(equity: &'a EquityCurve, trades: &'a [Trade]) -> Self {
        Self {
            equity,
            trades,
            returns: equity.returns(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    /// Annualized risk-free rate used by [`sharpe_ratio`](Self::sharpe_ratio).
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Per-step returns the statistics are computed from.
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn total_return(&self) -> f64 {
        match (self.equity.first(), self.equity.last()) {
            (Some(first), Some(last)) if self.equity.len() >= 2 => {
                (last.equity - first.equity) / first.equity
            }
            _ => 0.0,
        }
    }

    /// Compound annual growth rate over the calendar days spanned by the curve.
    pub fn cagr(&self) -> f64 {
        let (first, last) = match (self.equity.first(), self.equity.last()) {
            (Some(first), Some(last)) if self.equity.len() >= 2 => (first, last),
            _ => return 0.0,
        };

        let total_days = (last.timestamp - first.timestamp).num_days();
        if total_days <= 0 {
            return 0.0;
        }

        let years = total_days as f64 / DAYS_PER_YEAR;
        let total_return = self.total_return();
        if total_return <= -1.0 {
            return -1.0;
        }

        (1.0 + total_return).powf(1.0 / years) - 1.0
    }

    /// Annualized Sharpe ratio at the configured risk-free rate.
    pub fn sharpe_ratio(&self) -> f64 {
        if self.returns.len() < 2 {
            return 0.0;
        }

        let std = self.returns.iter().std_dev();
        if std == 0.0 || std.is_nan() {
            return 0.0;
        }

        let per_period_rf = self.risk_free_rate / TRADING_PERIODS_PER_YEAR;
        let mean_excess = self.returns.iter().map(|r| r - per_period_rf).mean();

        TRADING_PERIODS_PER_YEAR.sqrt() * mean_excess / std
    }

    /// Largest peak-to-trough decline as a positive fraction.
    pub fn max_drawdown(&self) -> f64 {
        if self.equity.len() < 2 {
            return 0.0;
        }

        let mut peak = f64::NEG_INFINITY;
        let mut worst = 0.0_f64;
        for point in self.equity.points() {
            peak = peak.max(point.equity);
            // f64::min ignores a NaN operand
            worst = worst.min((point.equity - peak) / peak);
        }
        worst.abs()
    }

    pub fn win_rate(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }

        let wins = self.trades.iter().filter(|t| t.pnl > 0.0).count();
        wins as f64 / self.trades.len() as f64
    }

    /// Gross profit over gross loss.
    pub fn profit_factor(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }

        let gross_profit: f64 = self.trades.iter().map(|t| t.pnl).filter(|p| *p > 0.0).sum();
        let gross_loss: f64 = self
            .trades
            .iter()
            .map(|t| t.pnl)
            .filter(|p| *p < 0.0)
            .sum::<f64>()
            .abs();

        if gross_loss == 0.0 {
            return if gross_profit > 0.0 {
                f64::INFINITY
            } else {
                0.0
            };
        }

        gross_profit / gross_loss
    }

    /// Sample standard deviation of returns, optionally annualized.
    pub fn volatility(&self, annualize: bool) -> f64 {
        if self.returns.len() < 2 {
            return 0.0;
        }

        let vol = self.returns.iter().std_dev();
        if annualize {
            vol * TRADING_PERIODS_PER_YEAR.sqrt()
        } else {
            vol
        }
    }

    /// One-step historical Value at Risk, reported as a positive loss fraction.
    pub fn value_at_risk(&self, confidence: f64) -> f64 {
        if self.returns.len() < 2 {
            return 0.0;
        }

        percentile(&self.returns, (1.0 - confidence) * 100.0).abs()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_return: self.total_return(),
            cagr: self.cagr(),
            sharpe_ratio: self.sharpe_ratio(),
            max_drawdown: self.max_drawdown(),
            volatility: self.volatility(true),
            var_95: self.value_at_risk(0.95),
            win_rate: self.win_rate(),
            profit_factor: self.profit_factor(),
            total_trades: self.trades.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::{Duration, TimeZone};
    use replay_core::Side;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn daily_curve(values: &[f64]) -> EquityCurve {
        EquityCurve::from_parts(
            (0..values.len()).map(|i| start() + Duration::days(i as i64)),
            values.iter().copied(),
        )
    }

    fn trade(pnl: f64) -> Trade {
        Trade {
            timestamp: start(),
            symbol: "BTC".to_string(),
            side: Side::Sell,
            quantity: 1.0,
            price: 100.0,
            commission: 0.0,
            pnl,
        }
    }

    #[test]
    fn test_returns_drop_first_point() {
        let curve = daily_curve(&[100.0, 110.0, 99.0]);
        let returns = curve.returns();
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.10, max_relative = 1e-12);
        assert_relative_eq!(returns[1], -0.10, max_relative = 1e-12);
    }

    #[test]
    fn test_total_return() {
        let curve = daily_curve(&[100.0, 90.0, 125.0]);
        let metrics = PerformanceMetrics::new(&curve, &[]);
        assert_relative_eq!(metrics.total_return(), 0.25);

        let single = daily_curve(&[100.0]);
        assert_eq!(PerformanceMetrics::new(&single, &[]).total_return(), 0.0);
        assert_eq!(PerformanceMetrics::new(&EquityCurve::new(), &[]).total_return(), 0.0);
    }

    #[test]
    fn test_cagr_over_one_year() {
        let curve = EquityCurve::from_parts(
            [start(), start() + Duration::days(365)],
            [100.0, 121.0],
        );
        assert_relative_eq!(
            PerformanceMetrics::new(&curve, &[]).cagr(),
            0.21,
            max_relative = 1e-12
        );

        let two_years = EquityCurve::from_parts(
            [start(), start() + Duration::days(730)],
            [100.0, 121.0],
        );
        assert_relative_eq!(
            PerformanceMetrics::new(&two_years, &[]).cagr(),
            0.10,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_cagr_sentinels() {
        // Total loss
        let wiped = daily_curve(&[100.0, 50.0, 0.0]);
        assert_eq!(PerformanceMetrics::new(&wiped, &[]).cagr(), -1.0);

        // No elapsed days
        let same_day = EquityCurve::from_parts([start(), start()], [100.0, 120.0]);
        assert_eq!(PerformanceMetrics::new(&same_day, &[]).cagr(), 0.0);

        // Less than a day between points truncates to zero days
        let intraday = EquityCurve::from_parts(
            [start(), start() + Duration::hours(23)],
            [100.0, 120.0],
        );
        assert_eq!(PerformanceMetrics::new(&intraday, &[]).cagr(), 0.0);

        assert_eq!(PerformanceMetrics::new(&daily_curve(&[100.0]), &[]).cagr(), 0.0);
    }

    #[test]
    fn test_sharpe_constant_equity_is_zero() {
        let curve = daily_curve(&[100.0; 30]);
        assert_eq!(PerformanceMetrics::new(&curve, &[]).sharpe_ratio(), 0.0);
    }

    #[test]
    fn test_sharpe_needs_two_returns() {
        let curve = daily_curve(&[100.0, 101.0]);
        assert_eq!(PerformanceMetrics::new(&curve, &[]).sharpe_ratio(), 0.0);
    }

    #[test]
    fn test_sharpe_formula() {
        let curve = daily_curve(&[100.0, 101.0, 100.5, 102.0, 101.0]);
        let metrics = PerformanceMetrics::new(&curve, &[]).with_risk_free_rate(0.03);

        let r = curve.returns();
        let n = r.len() as f64;
        let mean = r.iter().sum::<f64>() / n;
        let var = r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let expected = 252.0_f64.sqrt() * (mean - 0.03 / 252.0) / var.sqrt();

        assert_relative_eq!(metrics.sharpe_ratio(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_max_drawdown() {
        let curve = daily_curve(&[100.0, 110.0, 120.0, 90.0, 100.0]);
        assert_abs_diff_eq!(
            PerformanceMetrics::new(&curve, &[]).max_drawdown(),
            0.25,
            epsilon = 1e-12
        );

        let rising = daily_curve(&[100.0, 101.0, 102.0]);
        assert_eq!(PerformanceMetrics::new(&rising, &[]).max_drawdown(), 0.0);

        assert_eq!(PerformanceMetrics::new(&daily_curve(&[100.0]), &[]).max_drawdown(), 0.0);
    }

    #[test]
    fn test_win_rate() {
        let curve = daily_curve(&[100.0, 100.0]);
        assert_eq!(PerformanceMetrics::new(&curve, &[]).win_rate(), 0.0);

        let trades = vec![trade(10.0), trade(-5.0), trade(0.0), trade(3.0)];
        assert_relative_eq!(PerformanceMetrics::new(&curve, &trades).win_rate(), 0.5);
    }

    #[test]
    fn test_profit_factor() {
        let curve = daily_curve(&[100.0, 100.0]);

        assert_eq!(PerformanceMetrics::new(&curve, &[]).profit_factor(), 0.0);

        let losers = vec![trade(-10.0), trade(-5.0)];
        assert_eq!(PerformanceMetrics::new(&curve, &losers).profit_factor(), 0.0);

        let flat = vec![trade(0.0), trade(0.0)];
        assert_eq!(PerformanceMetrics::new(&curve, &flat).profit_factor(), 0.0);

        let winners = vec![trade(10.0), trade(0.0)];
        assert_eq!(
            PerformanceMetrics::new(&curve, &winners).profit_factor(),
            f64::INFINITY
        );

        let mixed = vec![trade(100.0), trade(-50.0), trade(200.0)];
        assert_relative_eq!(PerformanceMetrics::new(&curve, &mixed).profit_factor(), 6.0);
    }

    #[test]
    fn test_volatility() {
        let curve = daily_curve(&[100.0, 102.0, 99.0, 101.0]);
        let metrics = PerformanceMetrics::new(&curve, &[]);

        let daily = metrics.volatility(false);
        assert!(daily > 0.0);
        assert_relative_eq!(metrics.volatility(true), daily * 252.0_f64.sqrt());

        let short = daily_curve(&[100.0, 102.0]);
        assert_eq!(PerformanceMetrics::new(&short, &[]).volatility(true), 0.0);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile(&values, 0.0), 1.0);
        assert_relative_eq!(percentile(&values, 50.0), 3.0);
        assert_relative_eq!(percentile(&values, 100.0), 5.0);
        // rank = 0.05 * 4 = 0.2 -> 1 + 0.2 * (2 - 1)
        assert_relative_eq!(percentile(&values, 5.0), 1.2, max_relative = 1e-12);
        // Unsorted input
        assert_relative_eq!(percentile(&[5.0, 1.0, 3.0], 25.0), 2.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[7.0], 5.0), 7.0);
    }

    #[test]
    fn test_value_at_risk() {
        // Returns: -0.05, 0.0, +0.02, -0.01 (approximately)
        let curve = daily_curve(&[100.0, 95.0, 95.0, 96.9, 95.931]);
        let metrics = PerformanceMetrics::new(&curve, &[]);

        let expected = percentile(metrics.returns(), 5.0).abs();
        assert_relative_eq!(metrics.value_at_risk(0.95), expected);
        assert!(metrics.value_at_risk(0.95) > 0.04);

        let short = daily_curve(&[100.0, 90.0]);
        assert_eq!(PerformanceMetrics::new(&short, &[]).value_at_risk(0.95), 0.0);
    }

    #[test]
    fn test_summary_of_empty_curve_is_all_zero() {
        let curve = EquityCurve::new();
        let summary = PerformanceMetrics::new(&curve, &[]).summary();
        assert_eq!(summary, MetricsSummary::default());
    }
}
