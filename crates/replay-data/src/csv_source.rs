//! CSV data source.
//!
//! The first row is a header. One column holds the timestamp; every other
//! column whose cell parses as a number becomes a named field of the bar.
//! Non-numeric cells (exchange tags, symbols) are skipped.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use replay_core::error::DataError;
use replay_core::traits::DataSource;
use replay_core::types::{Bar, TimeSeries, Timeframe};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Header names accepted for the timestamp column.
const TIMESTAMP_COLUMNS: [&str; 5] = ["timestamp", "date", "Date", "Timestamp", "datetime"];

/// Naive formats tried after RFC 3339.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// CSV data source for historical data.
///
/// `path` is either a single file, used for every symbol, or a directory
/// holding one `<SYMBOL>.csv` per symbol.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a new CSV data source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NotFound(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// File that holds `symbol`.
    pub fn file_for(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", symbol))
        } else {
            self.path.clone()
        }
    }

    /// Load every row for `symbol`, sorted by timestamp.
    pub async fn load_all(&self, symbol: &str, timeframe: Timeframe) -> Result<TimeSeries, DataError> {
        let file = self.file_for(symbol);
        let content = tokio::fs::read_to_string(&file).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataError::NotFound(file.display().to_string()),
            _ => DataError::Parse(format!("{}: {}", file.display(), e)),
        })?;

        let series = parse_csv(&content, symbol, timeframe)?;
        debug!(symbol, file = %file.display(), rows = series.len(), "Loaded CSV");
        Ok(series)
    }
}

#[async_trait]
impl DataSource for CsvDataSource {
    async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, DataError> {
        let series = self.load_all(symbol, timeframe).await?;
        if series.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        // An empty window is still a valid series; the engine scores it as zero trades.
        let window = series.window(start, end);
        if window.is_empty() {
            warn!(symbol, %start, %end, rows = series.len(), "No rows inside the requested range");
        } else {
            info!(symbol, %start, %end, bars = window.len(), "Historical bars ready");
        }
        Ok(window.to_series())
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse CSV text into a series.
///
/// Rows may appear in any order; two rows with the same timestamp are an error.
pub fn parse_csv(content: &str, symbol: &str, timeframe: Timeframe) -> Result<TimeSeries, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::Parse(e.to_string()))?
        .clone();

    let ts_index = headers
        .iter()
        .position(|h| TIMESTAMP_COLUMNS.contains(&h))
        .ok_or_else(|| DataError::MissingColumn("timestamp".into()))?;

    let has_close = headers.iter().any(|h| h.eq_ignore_ascii_case("close"));
    let columns: Vec<String> = headers
        .iter()
        .map(|h| normalize_column(h, has_close))
        .collect();

    let mut bars = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::Parse(e.to_string()))?;
        let raw_ts = record
            .get(ts_index)
            .ok_or_else(|| DataError::Parse(format!("row {}: missing timestamp", row + 1)))?;

        let mut bar = Bar::new(parse_timestamp(raw_ts)?);
        for (i, cell) in record.iter().enumerate() {
            if i == ts_index {
                continue;
            }
            if let (Some(name), Ok(value)) = (columns.get(i), cell.parse::<f64>()) {
                bar.set(name.clone(), value);
            }
        }
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.timestamp);
    TimeSeries::from_bars(symbol, timeframe, bars)
}

fn normalize_column(header: &str, has_close: bool) -> String {
    let lower = header.to_ascii_lowercase();
    match lower.as_str() {
        "open" | "high" | "low" | "close" | "volume" => lower,
        "adj close" if !has_close => "close".to_string(),
        _ => header.to_string(),
    }
}

/// Parse a timestamp cell into Unix milliseconds (UTC).
pub fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamp, milliseconds if it has more than 10 digits
    if let Ok(ts) = value.parse::<i64>() {
        return Ok(if ts.abs() > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::Parse(format!("Could not parse timestamp: {}", value)))
}
