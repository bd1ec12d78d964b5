use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::PriceSeries;

/// Closing prices for several symbols on a shared date index.
///
/// The index is the first series' dates. Later series are reindexed onto it:
/// their sessions outside the index are dropped, and a symbol without a price
/// on an indexed date holds `None` there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Left-join the series on the first series' dates. Column order follows
    /// the input order; a repeated symbol replaces the earlier column.
    pub fn from_series(series: Vec<PriceSeries>) -> Self {
        let dates: Vec<NaiveDate> = series
            .first()
            .map(|first| {
                first
                    .points
                    .iter()
                    .map(|(date, _)| *date)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default();

        let mut symbols: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = Vec::new();

        for s in series {
            let by_date: BTreeMap<NaiveDate, Option<f64>> = s.points.into_iter().collect();
            let dropped = by_date.keys().filter(|d| dates.binary_search(d).is_err()).count();
            if dropped > 0 {
                tracing::debug!("{}: {} sessions outside the shared date index", s.symbol, dropped);
            }
            let column = dates
                .iter()
                .map(|d| by_date.get(d).copied().flatten())
                .collect();

            match symbols.iter().position(|existing| *existing == s.symbol) {
                Some(idx) => columns[idx] = column,
                None => {
                    symbols.push(s.symbol);
                    columns.push(column);
                }
            }
        }

        let rows = (0..dates.len())
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();

        Self { symbols, dates, rows }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn column_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn column(&self, symbol: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(symbol)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Simple daily returns on an aligned date index with no undefined values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl ReturnTable {
    /// Build from parts. Every row must have one value per symbol.
    pub fn new(symbols: Vec<String>, dates: Vec<NaiveDate>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(dates.len(), rows.len());
        debug_assert!(rows.iter().all(|r| r.len() == symbols.len()));
        Self { symbols, dates, rows }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(symbol)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
