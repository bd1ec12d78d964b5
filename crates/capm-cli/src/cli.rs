use std::path::PathBuf;

use analysis_core::AlignmentPolicy;
use chrono::NaiveDate;
use clap::Parser;

/// Estimate CAPM betas of stocks against a benchmark index from daily returns.
///
/// Every option falls back to its CAPM_* environment variable, then to the
/// built-in default.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ticker symbols to analyze (e.g., "RELIANCE.NS TCS.NS ^NSEI").
    #[arg(value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Benchmark symbol the stocks are regressed against.
    #[arg(long, short)]
    pub benchmark: Option<String>,

    /// First day of the window (format: YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Day after the last day of the window (format: YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Risk-free rate in percent (4.5 means 4.5%).
    #[arg(long = "risk-free-rate", short = 'r')]
    pub risk_free_rate: Option<f64>,

    /// Use raw closing prices instead of adjusted closes.
    #[arg(long)]
    pub raw_close: bool,

    /// How missing returns are dropped: "all-assets" or "per-pair".
    #[arg(long)]
    pub alignment: Option<AlignmentPolicy>,

    /// Confidence level of the coefficient intervals.
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Where the regression chart is written.
    #[arg(long)]
    pub plot_output: Option<PathBuf>,

    /// Skip writing the regression chart.
    #[arg(long)]
    pub no_plot: bool,
}
