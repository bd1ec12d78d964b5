mod cli;
mod config;

use anyhow::{Context, Result};
use capm_analysis::CapmEngine;
use capm_report::{
    render_coefficient_summary, render_regression_chart, render_results_table, summary_heading,
    ChartOptions, RESULTS_HEADING,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use yahoo_client::YahooFinanceClient;

use crate::cli::Cli;
use crate::config::CapmConfig;

const DEFAULT_LOG_FILTER: &str = "capm=info,capm_analysis=info,yahoo_client=warn";

/// `RUST_LOG_FORMAT=json` selects JSON log lines.
fn json_logging(format: Option<&str>) -> bool {
    format.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if json_logging(std::env::var("RUST_LOG_FORMAT").ok().as_deref()) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = CapmConfig::from_env().context("Failed to read configuration")?;
    config.apply_overrides(&cli);
    config.normalize();
    config.validate()?;

    tracing::info!(
        "Analyzing {} symbols against {} from {} to {} (rf {}%, {} alignment)",
        config.symbols.len(),
        config.benchmark,
        config.start,
        config.end,
        config.risk_free_rate_pct,
        config.alignment
    );

    let provider = match &config.yahoo_base_url {
        Some(url) => YahooFinanceClient::with_base_url(url.as_str()),
        None => YahooFinanceClient::new(),
    };

    let engine = CapmEngine::new(config.engine_config());
    let report = engine
        .run(&provider, &config.symbols, config.start, config.end)
        .await
        .context("CAPM analysis failed")?;

    for asset in &report.assets {
        println!("\n{}", summary_heading(&asset.symbol, &asset.benchmark));
        println!("{}", render_coefficient_summary(asset));
    }

    println!("\n{}", RESULTS_HEADING);
    println!("{}", render_results_table(&report.assets));

    if let Some(path) = &config.plot_output {
        let written = render_regression_chart(path, &report.assets, &ChartOptions::default())
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        println!("\nRegression chart written to {}", written.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_logging_switch() {
        assert!(json_logging(Some("json")));
        assert!(json_logging(Some("JSON")));
        assert!(!json_logging(Some("pretty")));
        assert!(!json_logging(None));
    }
}
