//! Multi-symbol calendar alignment.
//!
//! Given return series for multiple symbols, keep only the dates present in
//! every series (inner join). Nothing is padded or filled.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::returns::ReturnSeries;

/// Simple returns of several symbols on their common calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    /// Dates present in every input series (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Symbols in input map order.
    pub symbols: Vec<String>,
    /// One vector per symbol, each the same length as `dates`.
    pub values: Vec<Vec<f64>>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.values[i].as_slice())
    }
}

/// Inner-join the simple returns of every series on date.
///
/// An empty map yields an empty result.
pub fn align_inner(series: &BTreeMap<String, ReturnSeries>) -> AlignedReturns {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for rs in series.values() {
        let dates: BTreeSet<NaiveDate> = rs.points.iter().map(|p| p.date).collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }
    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

    let mut symbols = Vec::with_capacity(series.len());
    let mut values = Vec::with_capacity(series.len());
    for (symbol, rs) in series {
        let by_date: HashMap<NaiveDate, f64> =
            rs.points.iter().map(|p| (p.date, p.simple)).collect();
        // Every common date is in `by_date` by construction.
        let column = dates
            .iter()
            .filter_map(|d| by_date.get(d).copied())
            .collect();
        symbols.push(symbol.clone());
        values.push(column);
    }

    AlignedReturns {
        dates,
        symbols,
        values,
    }
}
