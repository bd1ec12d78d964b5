use std::path::{Path, PathBuf};

use analysis_core::AssetRegression;
use anyhow::Result;
use plotters::prelude::*;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Pixel size of one panel; panels are stacked vertically.
    pub panel_size: (u32, u32),
    pub point_radius: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            panel_size: (900, 560),
            point_radius: 3,
        }
    }
}

pub fn chart_title(asset: &str, benchmark: &str) -> String {
    format!("{} vs {}", asset, benchmark)
}

pub fn equation_label(alpha: f64, beta: f64) -> String {
    format!("y = {:.4} + {:.4}x", alpha, beta)
}

pub fn r_squared_label(r_squared: f64) -> String {
    format!("R² = {:.4}", r_squared)
}

/// Padded axis range over the finite values; a flat or empty range is
/// widened so the panel can still be drawn.
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (-0.01, 0.01);
    }
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 0.01, hi + 0.01);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

/// Render one scatter-with-fit panel per asset into a single SVG file.
pub fn render_regression_chart(
    path: &Path,
    regressions: &[AssetRegression],
    options: &ChartOptions,
) -> Result<PathBuf> {
    if regressions.is_empty() {
        return Err(anyhow::anyhow!("No regressions to chart"));
    }

    let (width, panel_height) = options.panel_size;
    let height = panel_height * regressions.len() as u32;
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((regressions.len(), 1));
    for (panel, regression) in panels.iter().zip(regressions) {
        draw_panel(panel, regression, options)?;
    }

    root.present()?;
    tracing::info!("Wrote {} regression panels to {}", regressions.len(), path.display());
    Ok(path.to_path_buf())
}

fn draw_panel(
    area: &DrawingArea<SVGBackend, plotters::coord::Shift>,
    regression: &AssetRegression,
    options: &ChartOptions,
) -> Result<()> {
    let points: Vec<(f64, f64)> = regression
        .samples
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let skipped = regression.samples.len() - points.len();
    if skipped > 0 {
        tracing::debug!("Skipping {} non-finite points for {}", skipped, regression.symbol);
    }

    let (x_lo, x_hi) = axis_range(points.iter().map(|p| p.0));
    let (y_lo, y_hi) = axis_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(chart_title(&regression.symbol, &regression.benchmark), ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(format!("{} Daily Returns", regression.benchmark))
        .y_desc(format!("{} Daily Returns", regression.symbol))
        .x_label_formatter(&|v| format!("{:.3}", v))
        .y_label_formatter(&|v| format!("{:.3}", v))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, options.point_radius, BLUE.mix(0.3).filled())),
    )?;

    let fit = &regression.fit;
    if fit.alpha.is_finite() && fit.beta.is_finite() {
        let line = [x_lo, x_hi].map(|x| (x, fit.alpha + fit.beta * x));
        chart.draw_series(LineSeries::new(line, RED.stroke_width(2)))?;
    }

    let x_text = x_lo + (x_hi - x_lo) * 0.04;
    let y_span = y_hi - y_lo;
    let font = ("sans-serif", 16).into_font();
    chart.draw_series([
        Text::new(equation_label(fit.alpha, fit.beta), (x_text, y_hi - y_span * 0.06), font.clone()),
        Text::new(r_squared_label(fit.r_squared), (x_text, y_hi - y_span * 0.13), font),
    ])?;

    Ok(())
}
