use analysis_core::{PriceTable, ReturnTable};
use chrono::NaiveDate;

/// Day-over-day simple returns before undefined rows are removed.
///
/// `rows[i][j]` is `None` when the return of symbol `j` on date `i` is
/// undefined: the first row, or either price missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReturns {
    pub symbols: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl RawReturns {
    /// Dates where both columns are defined, with the paired values
    /// as `(dates, x, y)` for `x = column x_col` and `y = column y_col`.
    pub fn pair(&self, x_col: usize, y_col: usize) -> (Vec<NaiveDate>, Vec<f64>, Vec<f64>) {
        let mut dates = Vec::new();
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (date, row) in self.dates.iter().zip(&self.rows) {
            if let (Some(x), Some(y)) = (row[x_col], row[y_col]) {
                dates.push(*date);
                xs.push(x);
                ys.push(y);
            }
        }
        (dates, xs, ys)
    }
}

/// Simple percentage change per column: `today / yesterday - 1`.
///
/// A zero previous price gives an infinite return, which is kept; only
/// missing or NaN results count as undefined.
pub fn pct_change(prices: &PriceTable) -> RawReturns {
    let width = prices.symbols().len();
    let rows = prices.rows();

    let mut out = Vec::with_capacity(rows.len());
    for i in 0..rows.len() {
        if i == 0 {
            out.push(vec![None; width]);
            continue;
        }
        let row = (0..width)
            .map(|j| match (rows[i - 1][j], rows[i][j]) {
                (Some(prev), Some(curr)) => {
                    let r = curr / prev - 1.0;
                    if r.is_nan() {
                        None
                    } else {
                        Some(r)
                    }
                }
                _ => None,
            })
            .collect();
        out.push(row);
    }

    RawReturns {
        symbols: prices.symbols().to_vec(),
        dates: prices.dates().to_vec(),
        rows: out,
    }
}

/// Remove every date on which any symbol has an undefined return.
pub fn drop_undefined(raw: &RawReturns) -> ReturnTable {
    let mut dates = Vec::new();
    let mut rows = Vec::new();

    for (date, row) in raw.dates.iter().zip(&raw.rows) {
        let defined: Option<Vec<f64>> = row.iter().copied().collect();
        if let Some(values) = defined {
            dates.push(*date);
            rows.push(values);
        }
    }

    let dropped = raw.dates.len() - dates.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} of {} return rows with undefined values", dropped, raw.dates.len());
    }

    ReturnTable::new(raw.symbols.clone(), dates, rows)
}

/// Compounded return over the window: `prod(1 + r) - 1`. An empty window is 0.
pub fn compounded_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::PriceSeries;
    use approx::assert_relative_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn table(cols: &[(&str, &[Option<f64>])]) -> PriceTable {
        let series = cols
            .iter()
            .map(|(sym, prices)| {
                let points = prices
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (date(i as u32 + 1), *p))
                    .collect();
                PriceSeries::new(*sym, points)
            })
            .collect();
        PriceTable::from_series(series)
    }

    #[test]
    fn test_pct_change() {
        let prices = table(&[("A", &[Some(100.0), Some(105.0), Some(103.0), Some(110.0)])]);
        let raw = pct_change(&prices);
        assert_eq!(raw.rows[0], vec![None]);
        assert_relative_eq!(raw.rows[1][0].unwrap(), 0.05, epsilon = 1e-12);
        assert_relative_eq!(raw.rows[2][0].unwrap(), 103.0 / 105.0 - 1.0, epsilon = 1e-12);
        assert_eq!(raw.rows.len(), 4);
    }

    #[test]
    fn test_missing_price_undefines_two_returns() {
        let prices = table(&[("A", &[Some(10.0), None, Some(12.0), Some(13.0)])]);
        let raw = pct_change(&prices);
        assert_eq!(raw.rows[1][0], None);
        assert_eq!(raw.rows[2][0], None);
        assert!(raw.rows[3][0].is_some());
    }

    #[test]
    fn test_missing_value_drops_date_for_all_assets() {
        let prices = table(&[
            ("STOCK", &[Some(10.0), Some(11.0), Some(12.0), Some(13.0), Some(14.0)]),
            ("^IDX", &[Some(100.0), Some(101.0), None, Some(103.0), Some(104.0)]),
        ]);
        let aligned = drop_undefined(&pct_change(&prices));

        // Row 0 is undefined for both; the gap on day 3 undefines days 3 and 4.
        assert_eq!(aligned.dates(), &[date(2), date(5)]);
        assert_eq!(aligned.column("STOCK").unwrap().len(), 2);
        assert_eq!(aligned.column("^IDX").unwrap().len(), 2);
        assert!(!aligned.dates().contains(&date(3)));
    }

    #[test]
    fn test_pair_keeps_dates_defined_for_both() {
        let prices = table(&[
            ("A", &[Some(10.0), Some(11.0), Some(12.0), Some(13.0)]),
            ("B", &[Some(5.0), Some(5.5), Some(6.0), None]),
            ("^IDX", &[Some(100.0), None, Some(102.0), Some(103.0)]),
        ]);
        let raw = pct_change(&prices);
        let (dates, x, y) = raw.pair(2, 0);
        assert_eq!(dates, vec![date(4)]);
        assert_eq!(x.len(), 1);
        assert_relative_eq!(y[0], 13.0 / 12.0 - 1.0, epsilon = 1e-12);

        // The global drop loses every row because B and ^IDX never overlap.
        assert!(drop_undefined(&raw).is_empty());
    }

    #[test]
    fn test_zero_price_keeps_infinite_return() {
        let prices = table(&[("A", &[Some(0.0), Some(1.0), Some(1.0)]), ("B", &[Some(0.0), Some(0.0), Some(1.0)])]);
        let raw = pct_change(&prices);
        assert_eq!(raw.rows[1][0], Some(f64::INFINITY));
        // 0 / 0 - 1 is NaN and therefore undefined
        assert_eq!(raw.rows[1][1], None);
    }

    #[test]
    fn test_compounded_return() {
        let r = compounded_return(&[0.01, -0.02, 0.03]);
        assert_relative_eq!(r, 1.01 * 0.98 * 1.03 - 1.0, epsilon = 1e-12);
        assert_eq!(compounded_return(&[]), 0.0);
    }
}
