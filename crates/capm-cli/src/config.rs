use std::env;
use std::path::PathBuf;

use analysis_core::{AlignmentPolicy, PriceField};
use anyhow::{bail, Context, Result};
use capm_analysis::EngineConfig;
use chrono::NaiveDate;

use crate::cli::Cli;

const DEFAULT_SYMBOLS: &str = "RELIANCE.NS,TCS.NS,HDFCBANK.NS,INFY.NS,BHARTIARTL.NS,^NSEI";
const DEFAULT_PLOT_OUTPUT: &str = "capm_regression.svg";

#[derive(Debug, Clone)]
pub struct CapmConfig {
    pub symbols: Vec<String>,
    pub benchmark: String,
    pub start: NaiveDate,
    /// Exclusive end of the download window.
    pub end: NaiveDate,
    pub risk_free_rate_pct: f64,
    pub price_field: PriceField,
    pub alignment: AlignmentPolicy,
    pub confidence: f64,
    /// `None` disables the chart.
    pub plot_output: Option<PathBuf>,
    pub yahoo_base_url: Option<String>,
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_date(key: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("{} must be YYYY-MM-DD, got '{}'", key, raw))
}

impl CapmConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let alignment = var("CAPM_ALIGNMENT", "all-assets")
            .parse::<AlignmentPolicy>()
            .map_err(anyhow::Error::msg)
            .context("CAPM_ALIGNMENT")?;

        let adjusted: bool = var("CAPM_ADJUSTED", "true")
            .trim()
            .parse()
            .context("CAPM_ADJUSTED must be true or false")?;

        let plot_output = match lookup("CAPM_PLOT_OUTPUT") {
            Some(v) if v.trim().is_empty() || v.trim().eq_ignore_ascii_case("none") => None,
            Some(v) => Some(PathBuf::from(v.trim())),
            None => Some(PathBuf::from(DEFAULT_PLOT_OUTPUT)),
        };

        let config = Self {
            symbols: parse_symbols(&var("CAPM_SYMBOLS", DEFAULT_SYMBOLS)),
            benchmark: var("CAPM_BENCHMARK", "^NSEI").trim().to_string(),
            start: parse_date("CAPM_START", &var("CAPM_START", "2025-01-01"))?,
            end: parse_date("CAPM_END", &var("CAPM_END", "2025-12-31"))?,
            risk_free_rate_pct: var("CAPM_RISK_FREE_RATE", "4.5")
                .trim()
                .parse()
                .context("CAPM_RISK_FREE_RATE must be a number")?,
            price_field: if adjusted { PriceField::AdjClose } else { PriceField::Close },
            alignment,
            confidence: var("CAPM_CONFIDENCE", "0.95")
                .trim()
                .parse()
                .context("CAPM_CONFIDENCE must be a number")?,
            plot_output,
            yahoo_base_url: lookup("YAHOO_BASE_URL").filter(|v| !v.trim().is_empty()),
        };

        Ok(config)
    }

    /// Command-line values win over the environment.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if !cli.symbols.is_empty() {
            self.symbols = cli.symbols.iter().flat_map(|s| parse_symbols(s)).collect();
        }
        if let Some(benchmark) = &cli.benchmark {
            self.benchmark = benchmark.trim().to_string();
        }
        if let Some(start) = cli.start {
            self.start = start;
        }
        if let Some(end) = cli.end {
            self.end = end;
        }
        if let Some(rate) = cli.risk_free_rate {
            self.risk_free_rate_pct = rate;
        }
        if cli.raw_close {
            self.price_field = PriceField::Close;
        }
        if let Some(alignment) = cli.alignment {
            self.alignment = alignment;
        }
        if let Some(confidence) = cli.confidence {
            self.confidence = confidence;
        }
        if let Some(path) = &cli.plot_output {
            self.plot_output = Some(path.clone());
        }
        if cli.no_plot {
            self.plot_output = None;
        }
    }

    /// Drop duplicate symbols and make sure the benchmark is fetched.
    pub fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.symbols.retain(|s| seen.insert(s.clone()));

        if !self.benchmark.is_empty() && !self.symbols.contains(&self.benchmark) {
            tracing::info!("Adding benchmark {} to the symbol list", self.benchmark);
            self.symbols.push(self.benchmark.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.benchmark.is_empty() {
            bail!("Benchmark symbol must not be empty");
        }
        if self.symbols.is_empty() {
            bail!("No symbols to analyze");
        }
        if self.symbols.iter().all(|s| *s == self.benchmark) {
            bail!("Symbol list contains only the benchmark {}", self.benchmark);
        }
        if self.start >= self.end {
            bail!("Start date {} must be before end date {}", self.start, self.end);
        }
        if !self.risk_free_rate_pct.is_finite() {
            bail!("Risk-free rate must be a finite number");
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            bail!("Confidence level must be between 0 and 1, got {}", self.confidence);
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            benchmark: self.benchmark.clone(),
            risk_free_rate_pct: self.risk_free_rate_pct,
            alignment: self.alignment,
            price_field: self.price_field,
            confidence: self.confidence,
        }
    }
}
