//! Analysis orchestration.
//!
//! `Analyzer` composes the engine stages over bars supplied by a
//! `MarketDataProvider`:
//!
//! ```text
//! fetch → PriceSeries → ReturnSeries → RiskMetricsResult
//!                     ↘ IndicatorTable ──────────────────→ FeatureTable
//! ```
//!
//! A portfolio request runs one such pipeline per instrument (in parallel
//! with rayon unless disabled), then joins the successful return series for
//! correlation and the equal-weight portfolio. A failing instrument is
//! recorded next to its siblings, never aborting the batch.

use std::collections::{BTreeMap, BTreeSet};

use finlab_core::data::{DataSource, MarketDataProvider};
use finlab_core::features::FeatureParams;
use finlab_core::{
    build_features, build_indicator_table, compute_returns, compute_risk_metrics,
    correlation_matrix, equal_weight_returns, AnalysisConfig, AnalysisError, AnalysisResult,
    CorrelationMatrix, DateRange, ExtremePairs, FeatureTable, IndicatorTable, Instrument,
    PriceSeries, ReturnSeries, RiskMetricsResult,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Number of most-negative / most-positive pairs reported for a portfolio.
pub const EXTREME_PAIRS: usize = 3;

/// Everything computed for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAnalysis {
    pub symbol: String,
    pub source: DataSource,
    /// BLAKE3 over the normalized bars.
    pub dataset_hash: String,
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub risk: RiskMetricsResult,
    pub indicators: IndicatorTable,
    pub features: FeatureTable,
}

/// Result of a multi-instrument request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub name: String,
    pub range: DateRange,
    /// One entry per requested symbol, success or failure.
    pub instruments: BTreeMap<String, Result<InstrumentAnalysis, AnalysisError>>,
    /// Over the successful instruments only.
    pub correlation: Result<CorrelationMatrix, AnalysisError>,
    pub extremes: Option<ExtremePairs>,
    /// Risk of the equal-weight mix of the successful instruments.
    pub equal_weight: Result<RiskMetricsResult, AnalysisError>,
}

impl PortfolioAnalysis {
    pub fn succeeded(&self) -> impl Iterator<Item = &InstrumentAnalysis> {
        self.instruments.values().filter_map(|r| r.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &AnalysisError)> {
        self.instruments
            .iter()
            .filter_map(|(s, r)| r.as_ref().err().map(|e| (s.as_str(), e)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }
}

/// Drives single-instrument and portfolio analyses against one provider.
pub struct Analyzer<'a> {
    provider: &'a dyn MarketDataProvider,
    parallel: bool,
}

impl<'a> Analyzer<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider) -> Self {
        Self {
            provider,
            parallel: true,
        }
    }

    /// Fan out portfolio instruments across the rayon pool (default) or not.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Full pipeline for one instrument.
    pub fn analyze_single(
        &self,
        symbol: &str,
        config: &AnalysisConfig,
    ) -> AnalysisResult<InstrumentAnalysis> {
        config.validate()?;
        info!(
            symbol,
            provider = self.provider.name(),
            start = %config.range.start,
            end = %config.range.end,
            "analyzing instrument"
        );
        self.run_instrument(symbol, config)
    }

    /// Per-instrument pipelines plus correlation and the equal-weight portfolio.
    ///
    /// Only configuration problems (invalid config, empty or blank symbol
    /// list) fail the whole request.
    pub fn analyze_portfolio(
        &self,
        name: &str,
        symbols: &[String],
        config: &AnalysisConfig,
    ) -> AnalysisResult<PortfolioAnalysis> {
        config.validate()?;
        let symbols = unique_symbols(symbols)?;
        info!(
            portfolio = name,
            instruments = symbols.len(),
            provider = self.provider.name(),
            parallel = self.parallel,
            "analyzing portfolio"
        );

        let run = |symbol: &String| (symbol.clone(), self.run_instrument(symbol, config));
        let instruments: BTreeMap<String, Result<InstrumentAnalysis, AnalysisError>> =
            if self.parallel {
                symbols.par_iter().map(run).collect()
            } else {
                symbols.iter().map(run).collect()
            };

        for (symbol, result) in &instruments {
            if let Err(e) = result {
                warn!(symbol = %symbol, kind = e.kind(), error = %e, "instrument failed");
            }
        }

        let returns: BTreeMap<String, ReturnSeries> = instruments
            .iter()
            .filter_map(|(s, r)| r.as_ref().ok().map(|a| (s.clone(), a.returns.clone())))
            .collect();

        let correlation = correlation_matrix(&returns);
        if let Err(e) = &correlation {
            warn!(portfolio = name, error = %e, "correlation unavailable");
        }
        let extremes = correlation
            .as_ref()
            .ok()
            .map(|m| m.extreme_pairs(EXTREME_PAIRS));

        let params = config.risk_params();
        let equal_weight =
            equal_weight_returns(&returns).and_then(|r| compute_risk_metrics(&r, &params));

        let analysis = PortfolioAnalysis {
            name: name.to_string(),
            range: config.range,
            instruments,
            correlation,
            extremes,
            equal_weight,
        };
        info!(
            portfolio = name,
            succeeded = analysis.success_count(),
            failed = analysis.failed().count(),
            "portfolio analysis complete"
        );
        Ok(analysis)
    }

    fn run_instrument(
        &self,
        symbol: &str,
        config: &AnalysisConfig,
    ) -> AnalysisResult<InstrumentAnalysis> {
        let instrument = Instrument::new(symbol)?;
        let symbol = instrument.symbol.clone();
        let range = config.range;

        let raw = self
            .provider
            .fetch(&symbol, range.start, range.end)
            .map_err(|e| AnalysisError::instrument(&symbol, e.to_string()))?;
        debug!(symbol = %symbol, raw_bars = raw.len(), "fetched");

        let prices = PriceSeries::from_raw(instrument, raw, &range, config.missing_close)?;
        let returns = compute_returns(&prices)?;
        let risk = compute_risk_metrics(&returns, &config.risk_params())?;
        debug!(
            symbol = %symbol,
            bars = prices.len(),
            total_return = risk.total_return,
            sharpe = risk.sharpe_ratio,
            "risk computed"
        );

        let indicators = build_indicator_table(&prices, &config.indicators)?;
        let features = build_features(
            &prices,
            &returns,
            &indicators,
            &risk,
            FeatureParams {
                window: config.feature_window,
                periods_per_year: config.periods_per_year,
            },
        )?;
        debug!(symbol = %symbol, rows = features.len(), "features built");

        Ok(InstrumentAnalysis {
            dataset_hash: dataset_hash(&prices),
            source: self.provider.source(),
            symbol,
            prices,
            returns,
            risk,
            indicators,
            features,
        })
    }
}

/// Deterministic BLAKE3 hash over the normalized bars of one series.
pub fn dataset_hash(prices: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prices.symbol().as_bytes());
    for bar in prices.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Trimmed, first-occurrence-ordered symbols; empty lists are rejected.
fn unique_symbols(symbols: &[String]) -> AnalysisResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(symbols.len());
    for s in symbols {
        let s = s.trim();
        if s.is_empty() {
            return Err(AnalysisError::config("blank symbol in portfolio"));
        }
        if seen.insert(s.to_string()) {
            out.push(s.to_string());
        }
    }
    if out.is_empty() {
        return Err(AnalysisError::config("portfolio has no symbols"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;
    use chrono::NaiveDate;
    use finlab_core::IndicatorSpec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig::new(DateRange::new(d(1), d(31)).unwrap())
            .with_indicators(vec![IndicatorSpec::Sma { window: 3 }])
    }

    fn provider() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_closes("A", d(1), &[100.0, 102.0, 101.0, 105.0, 103.0])
            .with_closes("B", d(1), &[50.0, 49.0, 51.0, 50.5, 52.0])
    }

    #[test]
    fn single_runs_every_stage() {
        let p = provider();
        let a = Analyzer::new(&p).analyze_single("A", &config()).unwrap();
        assert_eq!(a.prices.len(), 5);
        assert_eq!(a.returns.len(), 4);
        assert_eq!(a.indicators.column_names(), vec!["SMA_3"]);
        assert_eq!(a.features.len(), 5);
        assert_eq!(a.source, DataSource::InMemory);
        assert!((a.risk.total_return - 0.03).abs() < 1e-12);
        assert_eq!(a.dataset_hash.len(), 64);
    }

    #[test]
    fn unknown_symbol_is_instrument_error() {
        let p = provider();
        let err = Analyzer::new(&p).analyze_single("ZZZ", &config()).unwrap_err();
        assert_eq!(err.kind(), "instrument_data");
    }

    #[test]
    fn invalid_config_fails_before_fetch() {
        let p = provider();
        let cfg = config().with_indicators(vec![IndicatorSpec::Sma { window: 0 }]);
        let err = Analyzer::new(&p).analyze_single("A", &cfg).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfiguration { .. }));
    }

    #[test]
    fn duplicate_symbols_collapse() {
        let syms = vec!["A".to_string(), " A ".to_string(), "B".to_string()];
        assert_eq!(unique_symbols(&syms).unwrap(), vec!["A", "B"]);
        assert!(unique_symbols(&[]).is_err());
        assert!(unique_symbols(&["  ".to_string()]).is_err());
    }

    #[test]
    fn hash_depends_on_bars() {
        let p = provider();
        let an = Analyzer::new(&p);
        let a = an.analyze_single("A", &config()).unwrap();
        let b = an.analyze_single("B", &config()).unwrap();
        assert_ne!(a.dataset_hash, b.dataset_hash);
        assert_eq!(a.dataset_hash, dataset_hash(&a.prices));
    }
}
