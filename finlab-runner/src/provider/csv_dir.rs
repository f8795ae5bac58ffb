//! CSV directory provider: one `<SYMBOL>.csv` file per instrument.
//!
//! Expected header: `date,open,high,low,close,volume`. Capitalized headers as
//! written by common download tools (`Date`, `Close`, ...) are accepted too and
//! extra columns such as `Adj Close` are ignored. Empty price cells are passed
//! on as NaN so the engine's missing-close policy decides.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use finlab_core::data::{DataError, DataSource, MarketDataProvider, RawBar};
use serde::Deserialize;
use tracing::debug;

use super::within_range;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open", default)]
    open: Option<f64>,
    #[serde(alias = "High", default)]
    high: Option<f64>,
    #[serde(alias = "Low", default)]
    low: Option<f64>,
    #[serde(alias = "Close", default)]
    close: Option<f64>,
    #[serde(alias = "Volume", default)]
    volume: Option<f64>,
}

impl CsvRow {
    fn into_raw(self) -> RawBar {
        let close = self.close.unwrap_or(f64::NAN);
        RawBar {
            date: self.date,
            open: self.open.unwrap_or(close),
            high: self.high.unwrap_or(close),
            low: self.low.unwrap_or(close),
            close,
            volume: self
                .volume
                .filter(|v| v.is_finite() && *v > 0.0)
                .map_or(0, |v| v.round() as u64),
        }
    }
}

/// Reads bars from `<dir>/<SYMBOL>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `symbol`.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_file(&self, symbol: &str, path: &Path) -> Result<Vec<RawBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| malformed(symbol, &e))?;

        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| DataError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("row {}: {e}", line + 1),
            })?;
            bars.push(row.into_raw());
        }
        Ok(bars)
    }
}

fn malformed(symbol: &str, err: &csv::Error) -> DataError {
    DataError::Malformed {
        symbol: symbol.to_string(),
        reason: err.to_string(),
    }
}

impl MarketDataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvFile
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars = self.read_file(symbol, &path)?;
        debug!(symbol, path = %path.display(), rows = bars.len(), "read csv");
        within_range(symbol, bars, start, end)
    }
}
