/// CAPM expected return as a fraction.
///
/// `risk_free_rate_pct` is a percentage (4.5 means 4.5%). `benchmark_return`
/// is the benchmark's raw compounded return over the same window, not an
/// annualised figure.
pub fn expected_return(risk_free_rate_pct: f64, beta: f64, benchmark_return: f64) -> f64 {
    let rf = risk_free_rate_pct / 100.0;
    rf + beta * (benchmark_return - rf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_expected_return() {
        let er = expected_return(4.5, 1.2, 0.10);
        assert_relative_eq!(er, 0.111, epsilon = 1e-12);
        assert_relative_eq!(er * 100.0, 11.1, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_beta_tracks_benchmark() {
        assert_relative_eq!(expected_return(6.0, 1.0, 0.08), 0.08, epsilon = 1e-12);
        assert_relative_eq!(expected_return(6.0, 0.0, 0.08), 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_beta_propagates() {
        assert!(expected_return(4.5, f64::NAN, 0.1).is_nan());
    }
}
