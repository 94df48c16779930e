//! Bars and ordered time series.
//!
//! A [`Bar`] is one row of historical data: a timestamp plus named numeric
//! columns. Plain OHLCV data uses the `open`/`high`/`low`/`close`/`volume`
//! columns, strategies that trade on other inputs read their own columns.
//!
//! [`SeriesView`] is a borrowed, read-only window of a [`TimeSeries`]. The
//! engine hands strategies views built with [`SeriesView::as_of`], which end at
//! the current step; a view has no way to reach the rows after it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Timeframe;
use crate::error::DataError;

/// One row of historical data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Numeric columns keyed by name
    pub fields: BTreeMap<String, f64>,
}

impl Bar {
    /// Create a bar with no columns.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    /// Create a standard OHLCV bar.
    pub fn ohlcv(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self::new(timestamp)
            .with_field("open", open)
            .with_field("high", high)
            .with_field("low", low)
            .with_field("close", close)
            .with_field("volume", volume)
    }

    /// Add or replace a column, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Add or replace a column.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.fields.insert(name.into(), value);
    }

    /// Read a column.
    #[inline]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    #[inline]
    pub fn open(&self) -> Option<f64> {
        self.get("open")
    }

    #[inline]
    pub fn high(&self) -> Option<f64> {
        self.get("high")
    }

    #[inline]
    pub fn low(&self) -> Option<f64> {
        self.get("low")
    }

    #[inline]
    pub fn close(&self) -> Option<f64> {
        self.get("close")
    }

    #[inline]
    pub fn volume(&self) -> Option<f64> {
        self.get("volume")
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Calendar date (UTC) of the bar.
    pub fn date(&self) -> NaiveDate {
        self.datetime().date_naive()
    }
}

/// Owned, chronologically ordered series of bars for one symbol.
///
/// Timestamps are strictly increasing; every constructor and `push` enforces it.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl TimeSeries {
    /// Create a new empty series.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::new(),
        }
    }

    /// Build a series from bars that are already in chronological order.
    pub fn from_bars(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<Self, DataError> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(DataError::Unordered {
                previous: pair[0].timestamp,
                next: pair[1].timestamp,
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        })
    }

    /// Append a bar; its timestamp must be later than the last one.
    pub fn push(&mut self, bar: Bar) -> Result<(), DataError> {
        if let Some(last) = self.bars.last() {
            if bar.timestamp <= last.timestamp {
                return Err(DataError::Unordered {
                    previous: last.timestamp,
                    next: bar.timestamp,
                });
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// View over the whole series.
    pub fn view(&self) -> SeriesView<'_> {
        SeriesView {
            symbol: &self.symbol,
            timeframe: self.timeframe,
            bars: &self.bars,
        }
    }

    /// Rows whose UTC calendar date falls in `[start, end]`, in original order.
    ///
    /// The end date is inclusive for the whole day, so intraday bars stamped
    /// on `end` are part of the window.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> SeriesView<'_> {
        let start_ms = start.and_time(NaiveTime::default()).and_utc().timestamp_millis();
        let end_ms = end
            .succ_opt()
            .map(|d| d.and_time(NaiveTime::default()).and_utc().timestamp_millis())
            .unwrap_or(i64::MAX);

        let lo = self.bars.partition_point(|b| b.timestamp < start_ms);
        let hi = self.bars.partition_point(|b| b.timestamp < end_ms).max(lo);

        SeriesView {
            symbol: &self.symbol,
            timeframe: self.timeframe,
            bars: &self.bars[lo..hi],
        }
    }
}

/// Borrowed window over a [`TimeSeries`].
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    symbol: &'a str,
    timeframe: Timeframe,
    bars: &'a [Bar],
}

impl<'a> SeriesView<'a> {
    pub fn symbol(&self) -> &'a str {
        self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &'a [Bar] {
        self.bars
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&'a Bar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&'a Bar> {
        self.bars.first()
    }

    /// The most recent bar visible in this view.
    pub fn last(&self) -> Option<&'a Bar> {
        self.bars.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Bar> {
        self.bars.iter()
    }

    /// Prefix of this view ending at `index` (inclusive).
    ///
    /// An index past the end yields the whole view.
    pub fn as_of(&self, index: usize) -> SeriesView<'a> {
        let end = (index + 1).min(self.bars.len());
        SeriesView {
            bars: &self.bars[..end],
            ..*self
        }
    }

    /// Values of one column, skipping bars that lack it.
    pub fn column(&self, name: &str) -> Vec<f64> {
        self.bars.iter().filter_map(|b| b.get(name)).collect()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.column("close")
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(Bar::datetime).collect()
    }

    /// Copy the view into an owned series.
    pub fn to_series(&self) -> TimeSeries {
        TimeSeries {
            symbol: self.symbol.to_string(),
            timeframe: self.timeframe,
            bars: self.bars.to_vec(),
        }
    }
}
