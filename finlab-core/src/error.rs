//! Engine error kinds.
//!
//! Every fallible engine operation returns `AnalysisError`. The enum is
//! `Clone + Serialize` so a portfolio request can carry one failure per
//! instrument next to its successful siblings and export them as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the analytics engine.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    /// Fewer observations than a computation requires.
    #[error("insufficient data for {what}: need at least {required}, got {actual}")]
    InsufficientData {
        what: String,
        required: usize,
        actual: usize,
    },

    /// Upstream data for one instrument is missing or malformed.
    #[error("instrument data error for '{symbol}': {reason}")]
    InstrumentData { symbol: String, reason: String },

    /// Aligned calendars share too few dates.
    #[error("insufficient overlap across {instruments} instruments: {common_dates} common dates, need at least {required}")]
    InsufficientOverlap {
        instruments: usize,
        common_dates: usize,
        required: usize,
    },

    /// Configuration rejected at entry.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl AnalysisError {
    pub fn insufficient(what: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            what: what.into(),
            required,
            actual,
        }
    }

    pub fn instrument(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstrumentData {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: msg.into(),
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InstrumentData { .. } => "instrument_data",
            Self::InsufficientOverlap { .. } => "insufficient_overlap",
            Self::InvalidConfiguration { .. } => "invalid_configuration",
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = AnalysisError::insufficient("returns", 2, 1);
        assert_eq!(
            err.to_string(),
            "insufficient data for returns: need at least 2, got 1"
        );
        let err = AnalysisError::instrument("AAPL", "empty series");
        assert!(err.to_string().contains("AAPL"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let err = AnalysisError::InsufficientOverlap {
            instruments: 2,
            common_dates: 1,
            required: 2,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"insufficient_overlap\""));
        let back: AnalysisError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
        assert_eq!(err.kind(), "insufficient_overlap");
    }
}
