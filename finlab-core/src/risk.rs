//! Risk metrics: pure functions over a return series.
//!
//! Every metric is a pure function: simple returns in, scalar out.
//! `compute_risk_metrics` bundles them into a `RiskMetricsResult`.

use serde::{Deserialize, Serialize};

use crate::config::{AnnualizationMethod, DEFAULT_PERIODS_PER_YEAR};
use crate::error::{AnalysisError, AnalysisResult};
use crate::returns::ReturnSeries;
use crate::stats;

/// Volatility below this is treated as zero when computing Sharpe.
const VOL_EPSILON: f64 = 1e-15;

/// Conventions applied when annualizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    pub periods_per_year: u32,
    /// Annual risk-free rate as a fraction (0.02 = 2%).
    pub risk_free_rate: f64,
    pub annualization: AnnualizationMethod,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            risk_free_rate: 0.0,
            annualization: AnnualizationMethod::Geometric,
        }
    }
}

/// Scalar risk statistics of one return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetricsResult {
    pub observations: usize,
    /// Compounded return over the whole window: `prod(1 + r) - 1`.
    pub total_return: f64,
    /// The annualized return selected by `annualization`.
    pub annualized_return: f64,
    pub annualized_return_geometric: f64,
    pub annualized_return_arithmetic: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    /// Most negative peak-to-trough decline, `<= 0`.
    pub max_drawdown: f64,
    pub mean_period_return: f64,
    pub period_volatility: f64,
    pub periods_per_year: u32,
    pub risk_free_rate: f64,
    pub annualization: AnnualizationMethod,
}

/// Compute all risk metrics for `returns` (simple returns are used throughout).
pub fn compute_risk_metrics(
    returns: &ReturnSeries,
    params: &RiskParams,
) -> AnalysisResult<RiskMetricsResult> {
    if returns.is_empty() {
        return Err(AnalysisError::insufficient(
            format!("risk metrics of '{}'", returns.symbol),
            1,
            0,
        ));
    }
    let simple = returns.simple();
    let ppy = params.periods_per_year;

    let geometric = annualized_return_geometric(&simple, ppy);
    let arithmetic = annualized_return_arithmetic(&simple, ppy);
    let annualized_return = match params.annualization {
        AnnualizationMethod::Geometric => geometric,
        AnnualizationMethod::Arithmetic => arithmetic,
    };
    let annualized_volatility = annualized_volatility(&simple, ppy);

    Ok(RiskMetricsResult {
        observations: simple.len(),
        total_return: total_return(&simple),
        annualized_return,
        annualized_return_geometric: geometric,
        annualized_return_arithmetic: arithmetic,
        annualized_volatility,
        sharpe_ratio: sharpe_ratio(annualized_return, annualized_volatility, params.risk_free_rate),
        max_drawdown: max_drawdown(&returns.value_index()),
        mean_period_return: stats::mean(&simple),
        period_volatility: stats::sample_std(&simple),
        periods_per_year: ppy,
        risk_free_rate: params.risk_free_rate,
        annualization: params.annualization,
    })
}

// ─── Individual metric functions ────────────────────────────────────

/// Compounded return: `prod(1 + r) - 1`. Zero for no returns.
pub fn total_return(simple: &[f64]) -> f64 {
    growth(simple) - 1.0
}

/// `stdev(r) * sqrt(periods_per_year)` with the sample stdev.
///
/// Zero for fewer than 2 observations.
pub fn annualized_volatility(simple: &[f64], periods_per_year: u32) -> f64 {
    stats::sample_std(simple) * f64::from(periods_per_year).sqrt()
}

/// `(prod(1 + r))^(periods_per_year / n) - 1`.
pub fn annualized_return_geometric(simple: &[f64], periods_per_year: u32) -> f64 {
    if simple.is_empty() {
        return 0.0;
    }
    let g = growth(simple);
    if g <= 0.0 {
        return -1.0;
    }
    g.powf(f64::from(periods_per_year) / simple.len() as f64) - 1.0
}

/// `(1 + mean(r))^periods_per_year - 1`.
pub fn annualized_return_arithmetic(simple: &[f64], periods_per_year: u32) -> f64 {
    if simple.is_empty() {
        return 0.0;
    }
    (1.0 + stats::mean(simple)).powf(f64::from(periods_per_year)) - 1.0
}

/// `(annualized_return - risk_free_rate) / annualized_volatility`, 0.0 when volatility is zero.
pub fn sharpe_ratio(annualized_return: f64, annualized_volatility: f64, risk_free_rate: f64) -> f64 {
    if annualized_volatility < VOL_EPSILON || !annualized_volatility.is_finite() {
        return 0.0;
    }
    let s = (annualized_return - risk_free_rate) / annualized_volatility;
    if s.is_finite() {
        s
    } else {
        0.0
    }
}

/// Per-point decline from the running peak: `value[t] / max(value[..=t]) - 1`.
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            if v > peak {
                peak = v;
            }
            if peak > 0.0 {
                v / peak - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Minimum of `drawdown_series` as a negative fraction (e.g. -0.15 = 15% drawdown).
///
/// 0.0 if the path never dips below its running peak.
pub fn max_drawdown(values: &[f64]) -> f64 {
    drawdown_series(values)
        .into_iter()
        .fold(0.0_f64, f64::min)
}

fn growth(simple: &[f64]) -> f64 {
    simple.iter().map(|r| 1.0 + r).product()
}
