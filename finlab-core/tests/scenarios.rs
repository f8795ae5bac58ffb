//! End-to-end scenarios over the public engine API.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use finlab_core::{
    build_features, build_indicator_table, compute_returns, compute_risk_metrics,
    correlation_matrix, default_indicators, AnalysisError, FeatureParams, IndicatorSpec,
    Instrument, PriceSeries, RiskParams,
};

fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    PriceSeries::from_closes(Instrument::new(symbol).unwrap(), start, closes).unwrap()
}

fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "actual={actual}, expected={expected}"
    );
}

#[test]
fn five_close_scenario() {
    let prices = series("SPY", &[100.0, 102.0, 101.0, 105.0, 103.0]);
    let returns = compute_returns(&prices).unwrap();
    let simple = returns.simple();

    assert_eq!(simple.len(), 4);
    for (got, want) in simple.iter().zip([0.02, -0.0098, 0.0396, -0.0190]) {
        assert_close(*got, want, 1e-4);
    }

    let risk = compute_risk_metrics(&returns, &RiskParams::default()).unwrap();
    assert_close(risk.total_return, 0.03, 1e-12);
    // Deepest decline is 105 → 103.
    assert_close(risk.max_drawdown, 103.0 / 105.0 - 1.0, 1e-12);
}

#[test]
fn negated_returns_correlate_at_minus_one() {
    let a = compute_returns(&series("A", &[100.0, 101.0, 99.0, 102.0, 100.0, 103.0])).unwrap();
    let mut b = a.clone();
    b.symbol = "B".into();
    for p in &mut b.points {
        p.simple = -p.simple;
    }
    let input: BTreeMap<_, _> = [("A".to_string(), a), ("B".to_string(), b)].into();

    let m = correlation_matrix(&input).unwrap();
    assert_close(m.get("A", "B").unwrap(), -1.0, 1e-12);
    assert_eq!(m.get("B", "A"), m.get("A", "B"));
    assert_eq!(m.get("A", "A"), Some(1.0));
}

#[test]
fn sma_longer_than_history_is_all_absent() {
    let prices = series("SPY", &[100.0, 101.0, 102.0]);
    let table = build_indicator_table(&prices, &[IndicatorSpec::Sma { window: 5 }]).unwrap();
    let sma = table.column("SMA_5").unwrap();
    assert_eq!(sma.len(), 3);
    assert!(sma.iter().all(Option::is_none));
}

#[test]
fn zero_window_fails_without_partial_table() {
    let prices = series("SPY", &[100.0, 101.0, 102.0]);
    let err = build_indicator_table(&prices, &[IndicatorSpec::Rsi { window: 0 }]).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidConfiguration { .. }));
}

#[test]
fn single_bar_has_no_returns() {
    let prices = series("SPY", &[100.0]);
    let err = compute_returns(&prices).unwrap_err();
    assert_eq!(err.kind(), "insufficient_data");
}

#[test]
fn full_single_instrument_pipeline() {
    let closes: Vec<f64> = (0..260)
        .map(|i| 100.0 * (1.0 + 0.0004 * i as f64) + (i as f64 * 0.2).sin())
        .collect();
    let prices = series("AAPL", &closes);
    let returns = compute_returns(&prices).unwrap();
    let indicators = build_indicator_table(&prices, &default_indicators()).unwrap();
    let risk = compute_risk_metrics(&returns, &RiskParams::default()).unwrap();
    let features = build_features(
        &prices,
        &returns,
        &indicators,
        &risk,
        FeatureParams {
            window: 20,
            periods_per_year: 252,
        },
    )
    .unwrap();

    assert_eq!(features.len(), prices.len());
    assert_eq!(features.indicator_names.len(), indicators.columns.len());
    // SMA_200 appears exactly at row 199.
    assert!(features.indicator("SMA_200", 198).is_none());
    assert!(features.indicator("SMA_200", 199).is_some());
    // Rolling stats need `window` log returns, the first of which is at row 1.
    assert!(features.rows[19].rolling.volatility.is_none());
    assert!(features.rows[20].rolling.volatility.is_some());
    assert!(features.rows.iter().all(|r| r.drawdown <= 0.0));
    assert!(risk.annualized_volatility > 0.0);
}
