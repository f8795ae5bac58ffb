//! Benchmarks for the indicator table and feature assembly.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finlab_core::{
    build_features, build_indicator_table, compute_returns, compute_risk_metrics,
    extended_indicators, FeatureParams, Instrument, PriceSeries, RiskParams,
};

fn long_series(n: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.01 + (t * 0.05).sin() * 5.0 + (t * 0.31).cos()
        })
        .collect();
    PriceSeries::from_closes(Instrument::with_class("BENCH", finlab_core::AssetClass::Equity), start, &closes)
        .expect("synthetic closes are positive")
}

fn bench_indicator_table(c: &mut Criterion) {
    let prices = long_series(5_000);
    let specs = extended_indicators();
    c.bench_function("indicator_table_extended_5000", |b| {
        b.iter(|| build_indicator_table(black_box(&prices), black_box(&specs)))
    });
}

fn bench_features(c: &mut Criterion) {
    let prices = long_series(5_000);
    let returns = compute_returns(&prices).expect("returns");
    let table = build_indicator_table(&prices, &extended_indicators()).expect("indicators");
    let risk = compute_risk_metrics(&returns, &RiskParams::default()).expect("risk");
    let params = FeatureParams {
        window: 20,
        periods_per_year: 252,
    };
    c.bench_function("features_5000", |b| {
        b.iter(|| build_features(black_box(&prices), &returns, &table, &risk, params))
    });
}

criterion_group!(benches, bench_indicator_table, bench_features);
criterion_main!(benches);
