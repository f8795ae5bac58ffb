//! Cross-asset correlation.
//!
//! Return series are inner-joined on date before any statistic is computed;
//! calendars that differ (equities vs. crypto weekends) only contribute the
//! dates they share.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::align_inner;
use crate::error::{AnalysisError, AnalysisResult};
use crate::returns::ReturnSeries;
use crate::stats;

/// Minimum number of common dates for a correlation.
pub const MIN_OVERLAP: usize = 2;

/// Pearson correlation matrix over simple returns.
///
/// Square and symmetric, diagonal exactly 1.0, entries in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row/column order.
    pub symbols: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    /// Number of common dates the matrix was computed over.
    pub observations: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One unordered pair of instruments and their correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

/// The strongest negative and positive relationships in a matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremePairs {
    /// Most negative first.
    pub most_negative: Vec<CorrelationPair>,
    /// Most positive first.
    pub most_positive: Vec<CorrelationPair>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.matrix[i][j])
    }

    /// Every off-diagonal pair once (upper triangle), in row order.
    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let n = self.symbols.len();
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                out.push(CorrelationPair {
                    first: self.symbols[i].clone(),
                    second: self.symbols[j].clone(),
                    correlation: self.matrix[i][j],
                });
            }
        }
        out
    }

    /// The `k` most negative and `k` most positive pairs.
    ///
    /// With fewer than `2k` pairs the two lists overlap.
    pub fn extreme_pairs(&self, k: usize) -> ExtremePairs {
        let mut pairs = self.pairs();
        pairs.sort_by(|a, b| a.correlation.total_cmp(&b.correlation));
        let most_negative = pairs.iter().take(k).cloned().collect();
        let most_positive = pairs.iter().rev().take(k).cloned().collect();
        ExtremePairs {
            most_negative,
            most_positive,
        }
    }
}

/// Correlation matrix of the simple returns in `series` on their common dates.
///
/// Fails with `InsufficientOverlap` when fewer than two dates are shared
/// (including an empty map). A pair where either side has zero variance over
/// the common dates is reported as 0.0.
pub fn correlation_matrix(
    series: &BTreeMap<String, ReturnSeries>,
) -> AnalysisResult<CorrelationMatrix> {
    let aligned = align_inner(series);
    if aligned.len() < MIN_OVERLAP {
        return Err(AnalysisError::InsufficientOverlap {
            instruments: series.len(),
            common_dates: aligned.len(),
            required: MIN_OVERLAP,
        });
    }

    let n = aligned.symbols.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let rho = match stats::pearson(&aligned.values[i], &aligned.values[j]) {
                Some(rho) => rho,
                None => {
                    warn!(
                        first = %aligned.symbols[i],
                        second = %aligned.symbols[j],
                        "zero-variance returns over common dates, correlation reported as 0"
                    );
                    0.0
                }
            };
            matrix[i][j] = rho;
            matrix[j][i] = rho;
        }
    }

    Ok(CorrelationMatrix {
        symbols: aligned.symbols,
        matrix,
        observations: aligned.dates.len(),
        start: aligned.dates[0],
        end: aligned.dates[aligned.dates.len() - 1],
    })
}
