//! Domain types for finlab

pub mod bar;
pub mod instrument;
pub mod price_series;

pub use bar::Bar;
pub use instrument::{AssetClass, Instrument};
pub use price_series::PriceSeries;
