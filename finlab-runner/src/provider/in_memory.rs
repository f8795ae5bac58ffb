//! Map-backed provider for tests and embedding.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use finlab_core::data::{DataError, DataSource, MarketDataProvider, RawBar};

use super::within_range;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: BTreeMap<String, Vec<RawBar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<RawBar>) {
        self.series.insert(symbol.into(), bars);
    }

    /// Builder form of `insert`.
    pub fn with_series(mut self, symbol: impl Into<String>, bars: Vec<RawBar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    /// Close-only bars on consecutive calendar days from `first_date`.
    pub fn with_closes(self, symbol: impl Into<String>, first_date: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| RawBar::from_close(first_date + chrono::Duration::days(i as i64), c))
            .collect();
        self.with_series(symbol, bars)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn source(&self) -> DataSource {
        DataSource::InMemory
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let bars = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        within_range(symbol, bars.clone(), start, end)
    }
}
