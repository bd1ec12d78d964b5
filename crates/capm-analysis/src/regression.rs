use analysis_core::{AnalysisError, RegressionFit};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Guards the t statistic against division by zero when |r| == 1.
const TINY: f64 = 1.0e-20;

/// Two-sided p-value of `t` under Student's t with `df` degrees of freedom.
/// NaN when the distribution is undefined (df <= 0) or `t` is NaN.
pub(crate) fn two_sided_p_value(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * dist.sf(t.abs()),
        Err(_) => f64::NAN,
    }
}

/// Quantile of Student's t with `df` degrees of freedom; NaN when undefined,
/// including any `p` outside [0, 1].
pub(crate) fn t_quantile(p: f64, df: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Least-squares fit of `y = alpha + beta * x`.
///
/// Moments use the population (1/n) normalisation. A zero-variance `x`
/// (or `y`) is not special-cased and leaves the dependent statistics NaN.
pub fn linregress(x: &[f64], y: &[f64]) -> Result<RegressionFit, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::CalculationError(format!(
            "regression inputs differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no aligned observations to regress".to_string(),
        ));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    let mut ss_xy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        ss_xy += dx * dy;
    }
    let ss_xx = ss_xx / n;
    let ss_yy = ss_yy / n;
    let ss_xy = ss_xy / n;

    // NaN stays NaN through clamp
    let r = (ss_xy / (ss_xx * ss_yy).sqrt()).clamp(-1.0, 1.0);

    let beta = ss_xy / ss_xx;
    let alpha = y_mean - beta * x_mean;

    // Two points always fit exactly
    let (p_value, std_err, intercept_stderr) = if x.len() == 2 {
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0, 0.0)
    } else {
        let df = n - 2.0;
        let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
        let std_err = ((1.0 - r * r) * ss_yy / ss_xx / df).sqrt();
        (
            two_sided_p_value(t, df),
            std_err,
            std_err * (ss_xx + x_mean * x_mean).sqrt(),
        )
    };

    Ok(RegressionFit {
        alpha,
        beta,
        r_value: r,
        r_squared: r * r,
        p_value,
        std_err,
        intercept_stderr,
        n_obs: x.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_recovers_noise_free_line() {
        let x: Vec<f64> = (0..50).map(|i| ((i as f64) * 0.37).sin() * 0.02).collect();
        let y: Vec<f64> = x.iter().map(|xi| 0.0005 + 1.3 * xi).collect();

        let fit = linregress(&x, &y).unwrap();
        assert_relative_eq!(fit.beta, 1.3, epsilon = 1e-9);
        assert_relative_eq!(fit.alpha, 0.0005, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert!(fit.p_value < 1e-12);
        assert_eq!(fit.n_obs, 50);
    }

    #[test]
    fn test_zero_variance_benchmark_is_nan() {
        let x = vec![0.25; 20];
        let y: Vec<f64> = (0..20).map(|i| i as f64 * 0.001).collect();
        let fit = linregress(&x, &y).unwrap();
        assert!(fit.beta.is_nan());
        assert!(fit.r_squared.is_nan());
        assert!(fit.r_value.is_nan());
        assert!(fit.p_value.is_nan());
    }

    #[test]
    fn test_negative_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];
        let fit = linregress(&x, &y).unwrap();
        assert_relative_eq!(fit.beta, -2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.alpha, 12.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_value, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noisy_fit_matches_hand_computed_moments() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![1.1, 1.9, 3.2, 3.9, 5.1, 5.8];
        let fit = linregress(&x, &y).unwrap();

        // Sxy = 16.9 and Sxx = 17.5 (unnormalised), both means 3.5
        assert_relative_eq!(fit.beta, 16.9 / 17.5, epsilon = 1e-12);
        assert_relative_eq!(fit.alpha, 3.5 - (16.9 / 17.5) * 3.5, epsilon = 1e-12);
        assert!(fit.r_squared > 0.99 && fit.r_squared < 1.0);
        assert!(fit.std_err > 0.0);

        // Slope standard error equals sqrt(SSR / (n - 2) / Sxx)
        let ssr: f64 = x
            .iter()
            .zip(&y)
            .map(|(xi, yi)| {
                let e = yi - (fit.alpha + fit.beta * xi);
                e * e
            })
            .sum();
        assert_relative_eq!(fit.std_err, (ssr / 4.0 / 17.5).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(linregress(&[], &[]), Err(AnalysisError::InsufficientData(_))));
        assert!(matches!(
            linregress(&[1.0, 2.0], &[1.0]),
            Err(AnalysisError::CalculationError(_))
        ));
    }

    #[test]
    fn test_two_observations_fit_exactly() {
        let fit = linregress(&[0.01, 0.02], &[0.02, 0.05]).unwrap();
        assert_relative_eq!(fit.beta, 3.0, epsilon = 1e-9);
        assert_eq!(fit.p_value, 0.0);
        assert_eq!(fit.std_err, 0.0);
        assert_eq!(fit.intercept_stderr, 0.0);

        let flat = linregress(&[0.01, 0.02], &[0.03, 0.03]).unwrap();
        assert_eq!(flat.p_value, 1.0);
        assert_eq!(flat.std_err, 0.0);
    }

    #[test]
    fn test_single_observation_is_nan() {
        let fit = linregress(&[0.01], &[0.02]).unwrap();
        assert!(fit.beta.is_nan());
        assert!(fit.p_value.is_nan());
    }

    #[test]
    fn test_t_quantile() {
        // t(0.975, 10) = 2.228
        assert_relative_eq!(t_quantile(0.975, 10.0), 2.2281, epsilon = 1e-3);
        assert!(t_quantile(0.975, 0.0).is_nan());
        assert!(t_quantile(1.25, 10.0).is_nan());
        assert!(t_quantile(-0.1, 10.0).is_nan());
        assert!(t_quantile(f64::NAN, 10.0).is_nan());
    }
}
