//! Return calculation.
//!
//! `simple[t] = close[t] / close[t-1] - 1`, `log[t] = ln(close[t] / close[t-1])`.
//! A return series has one point per price date except the first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::{AnalysisError, AnalysisResult};

/// Return observation dated at the later of the two closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub simple: f64,
    pub log: f64,
}

/// Returns derived from one `PriceSeries`; `len() == prices.len() - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbol: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Build from already-computed `(date, simple_return)` pairs; log returns are derived.
    ///
    /// Used for derived series such as the equal-weight portfolio.
    pub fn from_simple(symbol: impl Into<String>, simple: &[(NaiveDate, f64)]) -> Self {
        Self {
            symbol: symbol.into(),
            points: simple
                .iter()
                .map(|&(date, r)| ReturnPoint {
                    date,
                    simple: r,
                    log: (1.0 + r).ln(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn simple(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.simple).collect()
    }

    pub fn log(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.log).collect()
    }

    /// Cumulative value index starting at 1.0 before the first return.
    ///
    /// The result has `len() + 1` entries.
    pub fn value_index(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.points.len() + 1);
        let mut value = 1.0;
        out.push(value);
        for p in &self.points {
            value *= 1.0 + p.simple;
            out.push(value);
        }
        out
    }
}

/// Compute simple and log returns for a price series.
pub fn compute_returns(prices: &PriceSeries) -> AnalysisResult<ReturnSeries> {
    if prices.len() < 2 {
        return Err(AnalysisError::insufficient(
            format!("returns of '{}'", prices.symbol()),
            2,
            prices.len(),
        ));
    }
    let points = prices
        .bars()
        .windows(2)
        .map(|w| {
            let ratio = w[1].close / w[0].close;
            ReturnPoint {
                date: w[1].date,
                simple: ratio - 1.0,
                log: ratio.ln(),
            }
        })
        .collect();

    Ok(ReturnSeries {
        symbol: prices.symbol().to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_approx, make_series};

    #[test]
    fn returns_known_values() {
        let prices = make_series(&[100.0, 102.0, 101.0, 105.0, 103.0]);
        let r = compute_returns(&prices).unwrap();
        assert_eq!(r.len(), 4);
        let simple = r.simple();
        assert_approx(simple[0], 0.02, 1e-12);
        assert_approx(simple[1], 101.0 / 102.0 - 1.0, 1e-12);
        assert_approx(simple[2], 105.0 / 101.0 - 1.0, 1e-12);
        assert_approx(simple[3], 103.0 / 105.0 - 1.0, 1e-12);
        assert_approx(r.log()[0], (1.02_f64).ln(), 1e-12);
    }

    #[test]
    fn returns_dated_at_later_close() {
        let prices = make_series(&[10.0, 11.0, 12.0]);
        let r = compute_returns(&prices).unwrap();
        assert_eq!(r.dates(), prices.dates()[1..].to_vec());
    }

    #[test]
    fn single_bar_is_insufficient() {
        let prices = make_series(&[10.0]);
        let err = compute_returns(&prices).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn value_index_compounds_to_price_ratio() {
        let prices = make_series(&[100.0, 102.0, 101.0, 105.0, 103.0]);
        let r = compute_returns(&prices).unwrap();
        let idx = r.value_index();
        assert_eq!(idx.len(), 5);
        assert_eq!(idx[0], 1.0);
        assert_approx(*idx.last().unwrap(), 1.03, 1e-12);
    }

    #[test]
    fn from_simple_derives_log() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let r = ReturnSeries::from_simple("PORT", &[(d, 0.1)]);
        assert_approx(r.points[0].log, (1.1_f64).ln(), 1e-12);
    }
}
