//! Response model for the Yahoo Finance v8 chart endpoint.

use analysis_core::{AnalysisError, Bar};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResult {
    pub meta: ChartMeta,
    // Absent when the range holds no sessions
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChartMeta {
    #[serde(default)]
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseIndicator>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteIndicator {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdjCloseIndicator {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Extract the provider's error message from a chart payload, if it carries one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let envelope: ChartEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .chart
        .error
        .map(|e| format!("{}: {}", e.code, e.description))
}

/// Parse a chart payload into daily bars dated in exchange-local time.
///
/// Bars outside `[start, end)` are discarded. When the provider emits two
/// bars for one session (a live bar next to the settled one), the later bar
/// wins.
pub fn parse_chart(
    symbol: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Bar>, AnalysisError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| AnalysisError::InvalidData(format!("{}: malformed chart response: {}", symbol, e)))?;

    if let Some(err) = envelope.chart.error {
        return Err(AnalysisError::ApiError(format!(
            "{}: {}: {}",
            symbol, err.code, err.description
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AnalysisError::InvalidData(format!("{}: no chart result", symbol)))?;

    let offset = result.meta.gmtoffset;
    tracing::debug!(
        "{}: {} sessions, currency {:?}, timezone {:?}",
        symbol,
        result.timestamp.len(),
        result.meta.currency,
        result.meta.exchange_timezone_name
    );

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .unwrap_or_default()
        .adjclose;

    let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let date = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| AnalysisError::InvalidData(format!("{}: invalid timestamp {}", symbol, ts)))?
            .date_naive();

        if date < start || date >= end {
            continue;
        }

        let bar = Bar {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            adj_close: at(&adjclose, i),
            volume: at(&quote.volume, i),
        };

        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    Ok(bars)
}
