use analysis_core::{
    AlignmentPolicy, AnalysisError, AssetRegression, CapmReport, MarketDataProvider, PriceField,
    PriceSeries, PriceTable,
};
use chrono::NaiveDate;

use crate::capm::expected_return;
use crate::regression::linregress;
use crate::returns::{compounded_return, drop_undefined, pct_change};
use crate::summary::ols_summary;

/// Parameters of one CAPM run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub benchmark: String,
    /// Risk-free rate in percent.
    pub risk_free_rate_pct: f64,
    pub alignment: AlignmentPolicy,
    pub price_field: PriceField,
    /// Confidence level of the coefficient intervals.
    pub confidence: f64,
}

impl EngineConfig {
    pub fn new(benchmark: impl Into<String>, risk_free_rate_pct: f64) -> Self {
        Self {
            benchmark: benchmark.into(),
            risk_free_rate_pct,
            alignment: AlignmentPolicy::AllAssets,
            price_field: PriceField::AdjClose,
            confidence: 0.95,
        }
    }
}

/// Runs the acquisition, return and regression steps of a CAPM analysis.
pub struct CapmEngine {
    config: EngineConfig,
}

impl CapmEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch closing prices for every symbol, one request at a time, and join
    /// them on date.
    pub async fn fetch_prices(
        &self,
        provider: &dyn MarketDataProvider,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, AnalysisError> {
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            tracing::debug!("Requesting {} from {} ({} to {})", symbol, provider.name(), start, end);
            let bars = provider.fetch_daily_bars(symbol, start, end).await?;
            let s = PriceSeries::from_bars(symbol.as_str(), &bars, self.config.price_field);
            if s.defined_count() == 0 {
                tracing::warn!("{} has no closing prices between {} and {}", symbol, start, end);
            }
            series.push(s);
        }
        Ok(PriceTable::from_series(series))
    }

    /// Regress every non-benchmark column of `prices` on the benchmark.
    pub fn analyze(&self, prices: &PriceTable) -> Result<CapmReport, AnalysisError> {
        let benchmark = self.config.benchmark.as_str();
        let bench_col = prices
            .column_index(benchmark)
            .ok_or_else(|| AnalysisError::MissingSymbol(benchmark.to_string()))?;

        let raw = pct_change(prices);
        let aligned = drop_undefined(&raw);
        tracing::info!(
            "Aligned {} of {} return rows across {} symbols",
            aligned.len(),
            raw.dates.len(),
            prices.symbols().len()
        );

        let bench_returns = aligned
            .column(benchmark)
            .ok_or_else(|| AnalysisError::MissingSymbol(benchmark.to_string()))?;
        let benchmark_return = compounded_return(&bench_returns);

        let mut assets = Vec::new();
        for (col, symbol) in prices.symbols().iter().enumerate() {
            if col == bench_col {
                continue;
            }

            let (dates, x, y) = match self.config.alignment {
                AlignmentPolicy::AllAssets => {
                    let y = aligned
                        .column(symbol)
                        .ok_or_else(|| AnalysisError::MissingSymbol(symbol.clone()))?;
                    (aligned.dates().to_vec(), bench_returns.clone(), y)
                }
                AlignmentPolicy::PerPair => raw.pair(bench_col, col),
            };

            let window_return = compounded_return(&x);
            let fit = linregress(&x, &y).map_err(|e| match e {
                AnalysisError::InsufficientData(msg) => {
                    AnalysisError::InsufficientData(format!("{} vs {}: {}", symbol, benchmark, msg))
                }
                other => other,
            })?;
            let summary = ols_summary(&x, &y, benchmark, self.config.confidence);
            let expected = expected_return(self.config.risk_free_rate_pct, fit.beta, window_return);

            tracing::info!(
                "{}: beta={:.4} alpha={:.6} r2={:.4} n={}",
                symbol,
                fit.beta,
                fit.alpha,
                fit.r_squared,
                fit.n_obs
            );

            assets.push(AssetRegression {
                symbol: symbol.clone(),
                benchmark: benchmark.to_string(),
                fit,
                summary,
                benchmark_return: window_return,
                expected_return: expected,
                window_start: dates.first().copied(),
                window_end: dates.last().copied(),
                samples: x.into_iter().zip(y).collect(),
            });
        }

        Ok(CapmReport {
            benchmark: benchmark.to_string(),
            risk_free_rate_pct: self.config.risk_free_rate_pct,
            alignment: self.config.alignment,
            aligned_observations: aligned.len(),
            benchmark_return,
            assets,
        })
    }

    /// Fetch, align and regress in one pass.
    pub async fn run(
        &self,
        provider: &dyn MarketDataProvider,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CapmReport, AnalysisError> {
        let prices = self.fetch_prices(provider, symbols, start, end).await?;
        self.analyze(&prices)
    }
}
