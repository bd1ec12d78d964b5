use async_trait::async_trait;
use chrono::NaiveDate;
use crate::{AnalysisError, Bar};

/// Source of daily price history.
///
/// `start` is inclusive and `end` is exclusive. Implementations return bars in
/// ascending date order and leave gaps as `None` fields rather than failing.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, AnalysisError>;

    /// Short provider name used in log output.
    fn name(&self) -> &str;
}
