//! Market-data collaborator interface and raw bar alignment.

pub mod align;
pub mod provider;

pub use align::{align_inner, AlignedReturns};
pub use provider::{DataError, DataSource, MarketDataProvider, RawBar};
