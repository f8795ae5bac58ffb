//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Return length: one return per price date except the first
//! 2. Compounding round trip: prod(1 + r) equals last / first close
//! 3. Drawdown sign: max drawdown <= 0, and 0 iff the path never falls
//! 4. Sharpe totality: always finite
//! 5. Correlation shape: symmetric, unit diagonal, entries in [-1, 1]
//! 6. RSI range: always within [0, 100]

use std::collections::BTreeMap;

use chrono::NaiveDate;
use finlab_core::indicators::{Indicator, Rsi};
use finlab_core::{
    compute_returns, compute_risk_metrics, correlation_matrix, Instrument, PriceSeries,
    ReturnPoint, ReturnSeries, RiskParams,
};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), min_len..200)
}

fn series(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    PriceSeries::from_closes(Instrument::new("PROP").unwrap(), start, closes).unwrap()
}

fn return_series(symbol: &str, returns: &[f64]) -> ReturnSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    ReturnSeries {
        symbol: symbol.to_string(),
        points: returns
            .iter()
            .enumerate()
            .map(|(i, &r)| ReturnPoint {
                date: start + chrono::Duration::days(i as i64),
                simple: r,
                log: (1.0 + r).ln(),
            })
            .collect(),
    }
}

// ── 1-2. Returns ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn return_length_is_price_length_minus_one(closes in arb_closes(2)) {
        let r = compute_returns(&series(&closes)).unwrap();
        prop_assert_eq!(r.len(), closes.len() - 1);
    }

    #[test]
    fn compounding_round_trip(closes in arb_closes(2)) {
        let r = compute_returns(&series(&closes)).unwrap();
        let growth: f64 = r.points.iter().map(|p| 1.0 + p.simple).product();
        let expected = closes[closes.len() - 1] / closes[0];
        prop_assert!(
            ((growth - expected) / expected).abs() < 1e-9,
            "growth {} vs {}", growth, expected
        );
    }
}

// ── 3-4. Risk metrics ────────────────────────────────────────────────

proptest! {
    #[test]
    fn max_drawdown_non_positive_and_zero_iff_non_decreasing(closes in arb_closes(2)) {
        let r = compute_returns(&series(&closes)).unwrap();
        let m = compute_risk_metrics(&r, &RiskParams::default()).unwrap();
        prop_assert!(m.max_drawdown <= 0.0);
        let non_decreasing = closes.windows(2).all(|w| w[1] >= w[0]);
        prop_assert_eq!(m.max_drawdown == 0.0, non_decreasing);
    }

    #[test]
    fn sharpe_is_always_finite(closes in arb_closes(2), rf in 0.0..0.1_f64) {
        let r = compute_returns(&series(&closes)).unwrap();
        let params = RiskParams { risk_free_rate: rf, ..RiskParams::default() };
        let m = compute_risk_metrics(&r, &params).unwrap();
        prop_assert!(m.sharpe_ratio.is_finite());
        prop_assert!(m.annualized_volatility >= 0.0);
    }

    #[test]
    fn flat_prices_have_zero_sharpe(price in arb_price(), n in 2usize..50) {
        let r = compute_returns(&series(&vec![price; n])).unwrap();
        let m = compute_risk_metrics(&r, &RiskParams::default()).unwrap();
        prop_assert_eq!(m.sharpe_ratio, 0.0);
        prop_assert_eq!(m.max_drawdown, 0.0);
    }
}

// ── 5. Correlation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn correlation_matrix_shape(
        columns in (2usize..6, 3usize..60).prop_flat_map(|(k, n)| {
            prop::collection::vec(prop::collection::vec(-0.1..0.1_f64, n), k)
        })
    ) {
        let input: BTreeMap<String, ReturnSeries> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let symbol = format!("S{i}");
                let rs = return_series(&symbol, col);
                (symbol, rs)
            })
            .collect();
        let m = correlation_matrix(&input).unwrap();
        let k = columns.len();
        prop_assert_eq!(m.len(), k);
        for i in 0..k {
            prop_assert_eq!(m.matrix[i][i], 1.0);
            for j in 0..k {
                prop_assert_eq!(m.matrix[i][j], m.matrix[j][i]);
                prop_assert!((-1.0..=1.0).contains(&m.matrix[i][j]));
            }
        }
    }
}

// ── 6. RSI ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_within_bounds(closes in arb_closes(15), window in 2usize..14) {
        let prices = series(&closes);
        let out = Rsi::new(window).compute(prices.bars());
        prop_assert_eq!(out.len(), closes.len());
        prop_assert!(out[window].is_some());
        for v in out.into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&v), "RSI out of range: {}", v);
        }
    }
}
