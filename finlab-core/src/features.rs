//! Feature table assembly.
//!
//! One row per price date, left-joined with returns and indicator columns.
//! Missing values stay absent; nothing is imputed. Risk metrics are broadcast
//! unchanged to every row of the instrument.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::{AnalysisError, AnalysisResult};
use crate::indicators::{rolling, IndicatorTable};
use crate::returns::ReturnSeries;
use crate::risk::{drawdown_series, RiskMetricsResult};
use crate::stats;

/// Quantile used for the rolling historical VaR.
pub const VAR_QUANTILE: f64 = 0.05;

/// Instrument-level risk figures repeated on every row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl From<&RiskMetricsResult> for RiskSnapshot {
    fn from(r: &RiskMetricsResult) -> Self {
        Self {
            total_return: r.total_return,
            annualized_return: r.annualized_return,
            annualized_volatility: r.annualized_volatility,
            sharpe_ratio: r.sharpe_ratio,
            max_drawdown: r.max_drawdown,
        }
    }
}

/// Trailing-window statistics of log returns ending at a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub volatility: Option<f64>,
    pub sharpe: Option<f64>,
    pub var_5: Option<f64>,
    pub expected_shortfall: Option<f64>,
    pub skew: Option<f64>,
    pub kurtosis: Option<f64>,
}

/// One (instrument, date) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    pub simple_return: Option<f64>,
    pub log_return: Option<f64>,
    /// Ordered like `FeatureTable::indicator_names`.
    pub indicators: Vec<Option<f64>>,
    pub rolling: RollingStats,
    /// Close relative to its running maximum, `<= 0`.
    pub drawdown: f64,
    pub risk: RiskSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub symbol: String,
    pub indicator_names: Vec<String>,
    /// Window of the rolling statistics.
    pub window: usize,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indicator(&self, name: &str, row: usize) -> Option<f64> {
        let col = self.indicator_names.iter().position(|n| n == name)?;
        self.rows.get(row)?.indicators[col]
    }
}

/// Parameters of the rolling statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureParams {
    pub window: usize,
    pub periods_per_year: u32,
}

/// Assemble the feature table of one instrument.
///
/// `returns` and `indicators` must have been derived from `prices`; dates
/// that do not belong to `prices` are reported as `InstrumentData`.
pub fn build_features(
    prices: &PriceSeries,
    returns: &ReturnSeries,
    indicators: &IndicatorTable,
    risk: &RiskMetricsResult,
    params: FeatureParams,
) -> AnalysisResult<FeatureTable> {
    if params.window < 2 {
        return Err(AnalysisError::config("feature window must be >= 2"));
    }
    let dates = prices.dates();
    if indicators.dates != dates {
        return Err(AnalysisError::instrument(
            prices.symbol(),
            "indicator table is not aligned with the price series",
        ));
    }

    let by_date: HashMap<NaiveDate, (f64, f64)> = returns
        .points
        .iter()
        .map(|p| (p.date, (p.simple, p.log)))
        .collect();
    if by_date.len() != returns.len()
        || returns
            .points
            .iter()
            .any(|p| dates.binary_search(&p.date).is_err())
    {
        return Err(AnalysisError::instrument(
            prices.symbol(),
            "return series has dates outside the price series",
        ));
    }

    let joined: Vec<Option<(f64, f64)>> = dates.iter().map(|d| by_date.get(d).copied()).collect();
    let log: Vec<Option<f64>> = joined.iter().map(|j| j.map(|(_, l)| l)).collect();
    let rolling = rolling_stats(&log, params);
    let drawdown = drawdown_series(&prices.closes());
    let snapshot = RiskSnapshot::from(risk);

    let rows = prices
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| FeatureRow {
            symbol: prices.symbol().to_string(),
            date: bar.date,
            close: bar.close,
            volume: bar.volume,
            simple_return: joined[i].map(|(s, _)| s),
            log_return: joined[i].map(|(_, l)| l),
            indicators: indicators.columns.iter().map(|c| c.values[i]).collect(),
            rolling: rolling[i],
            drawdown: drawdown[i],
            risk: snapshot,
        })
        .collect();

    Ok(FeatureTable {
        symbol: prices.symbol().to_string(),
        indicator_names: indicators.columns.iter().map(|c| c.name.clone()).collect(),
        window: params.window,
        rows,
    })
}

fn rolling_stats(log: &[Option<f64>], params: FeatureParams) -> Vec<RollingStats> {
    let w = params.window;
    let ann = f64::from(params.periods_per_year);

    let volatility = rolling(log, w, |x| Some(stats::sample_std(x) * ann.sqrt()));
    let sharpe = rolling(log, w, |x| {
        let sd = stats::sample_std(x);
        Some(if sd > 0.0 {
            stats::mean(x) / sd * ann.sqrt()
        } else {
            0.0
        })
    });
    let var = rolling(log, w, |x| stats::quantile(x, VAR_QUANTILE));
    let es = rolling(log, w, |x| {
        let v = stats::quantile(x, VAR_QUANTILE)?;
        let tail: Vec<f64> = x.iter().copied().filter(|r| *r <= v).collect();
        Some(stats::mean(&tail))
    });
    let skew = rolling(log, w, stats::skewness);
    let kurt = rolling(log, w, stats::excess_kurtosis);

    (0..log.len())
        .map(|i| RollingStats {
            volatility: volatility[i],
            sharpe: sharpe[i],
            var_5: var[i],
            expected_shortfall: es[i],
            skew: skew[i],
            kurtosis: kurt[i],
        })
        .collect()
}
