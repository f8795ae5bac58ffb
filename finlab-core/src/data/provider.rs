//! Market-data provider trait and structured error types.
//!
//! The engine never fetches data itself. A `MarketDataProvider` supplies raw
//! daily bars for `(symbol, start, end)` and the orchestrator hands them to
//! `PriceSeries::from_raw` for normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily OHLCV bar from a data provider (before validation).
///
/// Missing prices are represented as NaN, exactly as a provider would hand
/// them over. Gaps (non-trading days) are simply absent rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl RawBar {
    /// Close-only raw bar.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data for '{symbol}' between {start} and {end}")]
    Empty {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("malformed data for '{symbol}': {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    CsvFile,
    InMemory,
    Synthetic,
}

/// Trait for market-data collaborators (CSV directory, in-memory map, synthetic).
///
/// Implementations return bars for the inclusive `[start, end]` range, or an
/// explicit not-found / empty error. They must be shareable across the
/// worker threads of a portfolio request.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Provenance tag attached to results built from this provider.
    fn source(&self) -> DataSource;

    /// Fetch daily OHLCV bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<RawBar>, DataError>;
}
