use analysis_core::{AssetRegression, CoefficientSummary};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

pub const RESULTS_HEADING: &str = "--- CAPM Analysis Results ---";

pub fn summary_heading(asset: &str, benchmark: &str) -> String {
    format!("--- Regression Summary for {} vs {} ---", asset, benchmark)
}

fn num(value: f64) -> Cell {
    Cell::new(format!("{:.4}", value)).set_alignment(CellAlignment::Right)
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled);
    table
}

/// Coefficient table in the layout of a statsmodels OLS summary:
/// fit statistics on top, then one row per coefficient.
pub fn render_coefficient_summary(regression: &AssetRegression) -> String {
    let summary = &regression.summary;
    let mut out = String::new();

    let mut stats = base_table();
    stats.add_row(vec![
        Cell::new("Dep. Variable:"),
        Cell::new(&regression.symbol),
        Cell::new("R-squared:"),
        num(regression.fit.r_squared),
    ]);
    stats.add_row(vec![
        Cell::new("No. Observations:"),
        Cell::new(summary.n_obs),
        Cell::new("Df Residuals:"),
        Cell::new(format!("{}", summary.df_resid)),
    ]);
    let sample = match (regression.window_start, regression.window_end) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => "n/a".to_string(),
    };
    stats.add_row(vec![
        Cell::new("Sample:"),
        Cell::new(sample),
        Cell::new("Conf. Level:"),
        Cell::new(format!("{}", summary.confidence)),
    ]);
    out.push_str(&stats.to_string());
    out.push('\n');
    out.push_str(&coefficient_table(summary).to_string());
    out
}

fn coefficient_table(summary: &CoefficientSummary) -> Table {
    let tail = (1.0 - summary.confidence) / 2.0;
    let mut table = base_table();
    table.set_header(vec![
        Cell::new(""),
        Cell::new("coef"),
        Cell::new("std err"),
        Cell::new("t"),
        Cell::new("P>|t|"),
        Cell::new(format!("[{:.3}", tail)),
        Cell::new(format!("{:.3}]", 1.0 - tail)),
    ]);
    for row in &summary.rows {
        table.add_row(vec![
            Cell::new(&row.name),
            num(row.coef),
            num(row.std_err),
            num(row.t_value),
            num(row.p_value),
            num(row.conf_low),
            num(row.conf_high),
        ]);
    }
    table
}

/// One row per asset: beta, R² and CAPM expected return in percent.
pub fn render_results_table(assets: &[AssetRegression]) -> String {
    let mut table = base_table();
    table.set_header(vec!["Stock", "Beta", "R-squared", "Expected Return (%)"]);
    for asset in assets {
        table.add_row(vec![
            Cell::new(&asset.symbol),
            num(asset.fit.beta),
            num(asset.fit.r_squared),
            num(asset.expected_return_percent()),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{CoefficientRow, RegressionFit};
    use chrono::NaiveDate;

    fn regression(symbol: &str, beta: f64, r_squared: f64, expected: f64) -> AssetRegression {
        let row = |name: &str, coef: f64| CoefficientRow {
            name: name.to_string(),
            coef,
            std_err: 0.05,
            t_value: coef / 0.05,
            p_value: 0.001,
            conf_low: coef - 0.1,
            conf_high: coef + 0.1,
        };
        AssetRegression {
            symbol: symbol.to_string(),
            benchmark: "^NSEI".to_string(),
            fit: RegressionFit {
                alpha: 0.0003,
                beta,
                r_value: r_squared.sqrt(),
                r_squared,
                p_value: 0.001,
                std_err: 0.05,
                intercept_stderr: 0.0001,
                n_obs: 240,
            },
            summary: CoefficientSummary {
                rows: vec![row("const", 0.0003), row("^NSEI", beta)],
                n_obs: 240,
                df_resid: 238.0,
                confidence: 0.95,
            },
            benchmark_return: 0.1,
            expected_return: expected,
            window_start: None,
            window_end: None,
            samples: vec![(0.01, 0.012), (-0.02, -0.021)],
        }
    }

    #[test]
    fn test_summary_heading() {
        assert_eq!(
            summary_heading("TCS.NS", "^NSEI"),
            "--- Regression Summary for TCS.NS vs ^NSEI ---"
        );
    }

    #[test]
    fn test_results_table_columns_and_precision() {
        let rendered = render_results_table(&[
            regression("RELIANCE.NS", 1.23456, 0.5, 0.111),
            regression("TCS.NS", 0.8, 0.25, 0.05),
        ]);
        for header in ["Stock", "Beta", "R-squared", "Expected Return (%)"] {
            assert!(rendered.contains(header), "missing {}", header);
        }
        assert!(rendered.contains("RELIANCE.NS"));
        assert!(rendered.contains("1.2346"));
        assert!(rendered.contains("0.5000"));
        assert!(rendered.contains("11.1000"));
        assert!(rendered.find("RELIANCE.NS") < rendered.find("TCS.NS"));
    }

    #[test]
    fn test_nan_prints_as_nan() {
        let rendered = render_results_table(&[regression("FLAT.NS", f64::NAN, f64::NAN, f64::NAN)]);
        assert!(rendered.contains("NaN"));
    }

    #[test]
    fn test_coefficient_summary_layout() {
        let rendered = render_coefficient_summary(&regression("INFY.NS", 0.9, 0.4, 0.08));
        assert!(rendered.contains("Dep. Variable:"));
        assert!(rendered.contains("INFY.NS"));
        assert!(rendered.contains("const"));
        assert!(rendered.contains("^NSEI"));
        assert!(rendered.contains("P>|t|"));
        assert!(rendered.contains("[0.025"));
        assert!(rendered.contains("0.975]"));
        assert!(rendered.contains("0.9000"));
        assert!(rendered.contains("238"));
        assert!(rendered.contains("Sample:"));
        assert!(rendered.contains("n/a"));
    }

    #[test]
    fn test_coefficient_summary_shows_window() {
        let mut reg = regression("INFY.NS", 0.9, 0.4, 0.08);
        reg.window_start = NaiveDate::from_ymd_opt(2025, 1, 2);
        reg.window_end = NaiveDate::from_ymd_opt(2025, 12, 30);
        let rendered = render_coefficient_summary(&reg);
        assert!(rendered.contains("2025-01-02 to 2025-12-30"));
        assert!(!rendered.contains("n/a"));
    }
}
