use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Daily OHLCV bar in exchange-local calendar time.
///
/// Providers report holidays and halted sessions as nulls, so every price
/// field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    /// Close adjusted for splits and dividends, when the provider supplies it.
    #[serde(default)]
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

/// Which closing price column to extract from a bar history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    Close,
    AdjClose,
}

/// Ordered (date, closing price) pairs for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<(NaiveDate, Option<f64>)>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Extract the closing series from a bar history.
    ///
    /// Asking for `AdjClose` from a history that carries no adjusted prices at
    /// all falls back to the raw close for the whole series, so a single
    /// series never mixes the two scales.
    pub fn from_bars(symbol: impl Into<String>, bars: &[Bar], field: PriceField) -> Self {
        let symbol = symbol.into();
        let has_adjusted = bars.iter().any(|b| b.adj_close.is_some());

        let use_adjusted = match field {
            PriceField::AdjClose if has_adjusted => true,
            PriceField::AdjClose => {
                if !bars.is_empty() {
                    tracing::warn!(
                        "{}: no adjusted closes in provider response, using raw close",
                        symbol
                    );
                }
                false
            }
            PriceField::Close => false,
        };

        let points = bars
            .iter()
            .map(|b| {
                let price = if use_adjusted { b.adj_close } else { b.close };
                (b.date, price)
            })
            .collect();

        Self { symbol, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of dates with a defined price.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|(_, p)| p.is_some()).count()
    }
}

/// How return rows with undefined values are removed before regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignmentPolicy {
    /// Drop a date for every asset if any asset is undefined on it.
    #[default]
    AllAssets,
    /// Drop a date only from the (asset, benchmark) pairs undefined on it.
    PerPair,
}

impl FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all-assets" | "all" | "global" => Ok(AlignmentPolicy::AllAssets),
            "per-pair" | "pair" | "pairwise" => Ok(AlignmentPolicy::PerPair),
            other => Err(format!(
                "unknown alignment policy '{}' (expected all-assets or per-pair)",
                other
            )),
        }
    }
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentPolicy::AllAssets => write!(f, "all-assets"),
            AlignmentPolicy::PerPair => write!(f, "per-pair"),
        }
    }
}

/// Closed-form single-regressor least-squares fit of `y = alpha + beta * x`.
///
/// Degenerate input (zero variance in `x`) is not special-cased; the affected
/// fields come out NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub alpha: f64,
    pub beta: f64,
    /// Pearson correlation, clamped to [-1, 1].
    pub r_value: f64,
    pub r_squared: f64,
    /// Two-sided p-value for the null hypothesis `beta == 0`.
    pub p_value: f64,
    pub std_err: f64,
    pub intercept_stderr: f64,
    pub n_obs: usize,
}

/// One row of an OLS coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub name: String,
    pub coef: f64,
    pub std_err: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Coefficient table of an OLS fit with an intercept (`const`) and one regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSummary {
    pub rows: Vec<CoefficientRow>,
    pub n_obs: usize,
    pub df_resid: f64,
    /// Confidence level of the interval columns (0.95 for a 95% interval).
    pub confidence: f64,
}

/// Full CAPM result for one non-benchmark asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRegression {
    pub symbol: String,
    pub benchmark: String,
    pub fit: RegressionFit,
    pub summary: CoefficientSummary,
    /// Compounded benchmark return over the window this regression used.
    pub benchmark_return: f64,
    /// CAPM expected return as a fraction (0.111 == 11.1%).
    pub expected_return: f64,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    /// (benchmark return, asset return) observations used in the fit.
    pub samples: Vec<(f64, f64)>,
}

impl AssetRegression {
    pub fn expected_return_percent(&self) -> f64 {
        self.expected_return * 100.0
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapmReport {
    pub benchmark: String,
    /// Risk-free rate as supplied, in percent.
    pub risk_free_rate_pct: f64,
    pub alignment: AlignmentPolicy,
    /// Number of aligned return rows shared by all assets.
    pub aligned_observations: usize,
    /// Benchmark compounded return over the globally aligned window.
    pub benchmark_return: f64,
    pub assets: Vec<AssetRegression>,
}
