//! Market-data collaborators.
//!
//! Every provider hands back raw bars for an inclusive date range and
//! reports a missing symbol or an empty range as an explicit `DataError`.
//! Normalization (sorting, duplicate dates, missing closes) stays in the
//! engine's `PriceSeries::from_raw`.

pub mod csv_dir;
pub mod in_memory;
pub mod synthetic;

pub use csv_dir::CsvDirProvider;
pub use in_memory::InMemoryProvider;
pub use synthetic::SyntheticProvider;

use chrono::NaiveDate;
use finlab_core::data::{DataError, RawBar};

/// Keep bars inside `[start, end]`; an empty result is a `DataError::Empty`.
pub(crate) fn within_range(
    symbol: &str,
    mut bars: Vec<RawBar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<RawBar>, DataError> {
    bars.retain(|b| b.date >= start && b.date <= end);
    if bars.is_empty() {
        return Err(DataError::Empty {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }
    Ok(bars)
}
