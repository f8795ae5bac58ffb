//! finlab core: the analytics engine.
//!
//! Deterministic pipeline from raw daily bars to analysis outputs:
//! - Domain types (bars, instruments, normalized price series)
//! - Simple and log returns
//! - Risk metrics (volatility, Sharpe, drawdown, total/annualized return)
//! - Technical indicators and the per-instrument indicator table
//! - Cross-asset correlation on an inner-joined calendar
//! - Flat feature table for export and modeling
//!
//! No file or network I/O happens here; market data arrives through the
//! `MarketDataProvider` trait implemented by callers.

pub mod config;
pub mod correlation;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod indicators;
pub mod portfolio;
pub mod returns;
pub mod risk;
pub mod stats;

pub use config::{
    default_indicators, extended_indicators, AnalysisConfig, AnnualizationMethod, DateRange,
    IndicatorSpec, MissingClosePolicy, MAX_WINDOW,
};
pub use correlation::{correlation_matrix, CorrelationMatrix, CorrelationPair, ExtremePairs};
pub use domain::{AssetClass, Bar, Instrument, PriceSeries};
pub use error::{AnalysisError, AnalysisResult};
pub use features::{build_features, FeatureParams, FeatureRow, FeatureTable, RiskSnapshot, RollingStats};
pub use indicators::{build_indicator_table, IndicatorColumn, IndicatorTable};
pub use portfolio::equal_weight_returns;
pub use returns::{compute_returns, ReturnPoint, ReturnSeries};
pub use risk::{compute_risk_metrics, RiskMetricsResult, RiskParams};
