use analysis_core::{AnalysisError, Bar, MarketDataProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};

mod chart;

pub use chart::parse_chart;

pub const BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Daily price history from the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at another host, e.g. a proxy or a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, AnalysisError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AnalysisError::Config(format!("invalid Yahoo base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AnalysisError::Config(format!("Yahoo base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    /// Get daily bars for `symbol` over `[start, end)`.
    pub async fn get_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, AnalysisError> {
        let period1 = epoch_seconds(start)?;
        let period2 = epoch_seconds(end)?;
        let url = self.chart_url(symbol)?;

        tracing::debug!("GET {} period1={} period2={}", url, period1, period2);

        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        if !status.is_success() {
            let detail = chart::error_message(&body).unwrap_or(body);
            return Err(AnalysisError::ApiError(format!(
                "{}: HTTP {}: {}",
                symbol, status, detail
            )));
        }

        let bars = parse_chart(symbol, &body, start, end)?;
        tracing::info!("Fetched {} daily bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, AnalysisError> {
        self.get_daily_history(symbol, start, end).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Midnight UTC of `date` as a Unix timestamp.
fn epoch_seconds(date: NaiveDate) -> Result<i64, AnalysisError> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| AnalysisError::InvalidData(format!("invalid date {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_seconds() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(epoch_seconds(date).unwrap(), 1_735_689_600);
    }

    #[test]
    fn test_chart_url() {
        let client = YahooFinanceClient::with_base_url("http://localhost:1234/");
        let url = client.chart_url("TCS.NS").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/TCS.NS");

        let client = YahooFinanceClient::with_base_url("http://localhost:1234/proxy");
        let url = client.chart_url("^NSEI").unwrap();
        assert!(url.path().starts_with("/proxy/v8/finance/chart/"));
        assert!(url.path().ends_with("NSEI"));
    }

    #[test]
    fn test_invalid_base_url() {
        let client = YahooFinanceClient::with_base_url("not a url");
        assert!(matches!(client.chart_url("X"), Err(AnalysisError::Config(_))));
    }
}
