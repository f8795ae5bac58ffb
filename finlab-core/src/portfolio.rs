//! Equal-weight portfolio of several instruments.

use std::collections::BTreeMap;

use crate::data::align_inner;
use crate::error::{AnalysisError, AnalysisResult};
use crate::returns::ReturnSeries;

pub const EQUAL_WEIGHT_SYMBOL: &str = "EQUAL_WEIGHT";

/// Daily-rebalanced equal-weight portfolio returns.
///
/// On each date common to every series the portfolio return is the mean of
/// the constituents' simple returns. Fails with `InsufficientOverlap` when no
/// date is shared.
pub fn equal_weight_returns(series: &BTreeMap<String, ReturnSeries>) -> AnalysisResult<ReturnSeries> {
    let aligned = align_inner(series);
    if aligned.is_empty() {
        return Err(AnalysisError::InsufficientOverlap {
            instruments: series.len(),
            common_dates: 0,
            required: 1,
        });
    }
    let weight = 1.0 / aligned.symbols.len() as f64;
    let simple: Vec<_> = aligned
        .dates
        .iter()
        .enumerate()
        .map(|(t, &date)| {
            let r: f64 = aligned.values.iter().map(|col| col[t] * weight).sum();
            (date, r)
        })
        .collect();
    Ok(ReturnSeries::from_simple(EQUAL_WEIGHT_SYMBOL, &simple))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::compute_returns;
    use crate::test_support::{assert_approx, make_series_for};

    #[test]
    fn mean_of_constituents() {
        let a = compute_returns(&make_series_for("A", &[100.0, 110.0, 99.0])).unwrap();
        let b = compute_returns(&make_series_for("B", &[50.0, 50.0, 55.0])).unwrap();
        let input: BTreeMap<_, _> = [("A".to_string(), a), ("B".to_string(), b)].into();

        let port = equal_weight_returns(&input).unwrap();
        assert_eq!(port.symbol, EQUAL_WEIGHT_SYMBOL);
        assert_eq!(port.len(), 2);
        assert_approx(port.points[0].simple, 0.05, 1e-12);
        assert_approx(port.points[1].simple, (-0.1 + 0.1) / 2.0, 1e-12);
    }

    #[test]
    fn empty_input_has_no_overlap() {
        let err = equal_weight_returns(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientOverlap { .. }));
    }
}
