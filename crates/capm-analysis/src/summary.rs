use analysis_core::{CoefficientRow, CoefficientSummary};
use nalgebra::{DMatrix, DVector};

use crate::regression::{t_quantile, two_sided_p_value};

/// OLS coefficient table for `y = const + beta * x` via the normal equations.
///
/// Rows are `const` then `regressor`. Standard errors come from
/// `sigma^2 (X'X)^-1` with `sigma^2 = SSR / (n - 2)`; the interval columns use
/// the two-sided Student's t quantile at `confidence`. A singular `X'X` yields
/// NaN in every column.
pub fn ols_summary(x: &[f64], y: &[f64], regressor: &str, confidence: f64) -> CoefficientSummary {
    let n = x.len().min(y.len());
    let names = ["const", regressor];
    let df_resid = n as f64 - 2.0;

    let nan_rows = || {
        names
            .iter()
            .map(|name| CoefficientRow {
                name: name.to_string(),
                coef: f64::NAN,
                std_err: f64::NAN,
                t_value: f64::NAN,
                p_value: f64::NAN,
                conf_low: f64::NAN,
                conf_high: f64::NAN,
            })
            .collect::<Vec<_>>()
    };

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { x[i] });
    let response = DVector::from_column_slice(&y[..n]);

    let xtx = design.transpose() * &design;
    let Some(xtx_inv) = xtx.try_inverse() else {
        tracing::debug!("Singular design matrix for regressor {}", regressor);
        return CoefficientSummary {
            rows: nan_rows(),
            n_obs: n,
            df_resid,
            confidence,
        };
    };

    let coefs = &xtx_inv * design.transpose() * &response;
    let residuals = &response - &design * &coefs;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / df_resid;
    let q = t_quantile(0.5 + confidence / 2.0, df_resid);

    let rows = names
        .iter()
        .enumerate()
        .map(|(k, name)| {
            let coef = coefs[k];
            let std_err = (sigma2 * xtx_inv[(k, k)]).sqrt();
            let t_value = coef / std_err;
            CoefficientRow {
                name: name.to_string(),
                coef,
                std_err,
                t_value,
                p_value: two_sided_p_value(t_value, df_resid),
                conf_low: coef - q * std_err,
                conf_high: coef + q * std_err,
            }
        })
        .collect();

    CoefficientSummary {
        rows,
        n_obs: n,
        df_resid,
        confidence,
    }
}
