//! Console tables and regression charts for CAPM results.

pub mod charts;
pub mod tables;

pub use charts::{render_regression_chart, ChartOptions};
pub use tables::{render_coefficient_summary, render_results_table, summary_heading, RESULTS_HEADING};
