//! Data source trait definitions.

use crate::error::DataError;
use crate::types::{TimeSeries, Timeframe};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Supplier of validated historical series.
///
/// Implementations do their I/O here, before a backtest starts; the engine
/// only ever sees the fully materialized [`TimeSeries`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch historical bars.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `timeframe` - The bar interval
    /// * `start` - First calendar day of the range (inclusive)
    /// * `end` - Last calendar day of the range (inclusive)
    ///
    /// # Returns
    /// A series ordered from oldest to newest with strictly increasing
    /// timestamps
    async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
