//! Historical data sources.

mod csv_source;

pub use csv_source::{parse_csv, parse_timestamp, CsvDataSource};

use chrono::NaiveDate;
use replay_core::traits::DataSource;
use replay_core::types::{TimeSeries, Timeframe};
use replay_core::ReplayResult;
use std::path::Path;

/// Load the `[start, end]` range of `symbol` from a CSV file or directory.
///
/// A range with no rows yields an empty series; a missing file or a file
/// without data rows is a [`ReplayError::Data`](replay_core::ReplayError::Data).
pub async fn load_csv(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: Timeframe,
    start: NaiveDate,
    end: NaiveDate,
) -> ReplayResult<TimeSeries> {
    let source = CsvDataSource::new(path)?;
    let series = source
        .get_historical_bars(symbol, timeframe, start, end)
        .await?;
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::error::DataError;
    use replay_core::ReplayError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_load_csv_window() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("BTC.csv"),
            "date,close\n2024-01-01,100\n2024-01-02,101\n2024-01-03,102\n",
        )
        .unwrap();

        let series = load_csv(dir.path(), "BTC", Timeframe::Daily, d(2024, 1, 2), d(2024, 1, 3))
            .await
            .unwrap();
        assert_eq!(series.view().closes(), vec![101.0, 102.0]);

        let outside = load_csv(dir.path(), "BTC", Timeframe::Daily, d(2020, 1, 1), d(2020, 12, 31))
            .await
            .unwrap();
        assert!(outside.is_empty());
    }

    #[tokio::test]
    async fn test_load_csv_missing_symbol_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(dir.path(), "SOL", Timeframe::Daily, d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::Data(DataError::NotFound(_))));

        let err = load_csv("/definitely/not/here", "BTC", Timeframe::Daily, d(2024, 1, 1), d(2024, 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::Data(DataError::NotFound(_))));
    }
}
