//! Technical indicators.
//!
//! Indicators are pure functions: bar history in, one column out. Each column
//! has the same length as the bar history; warmup cells are `None` (absent),
//! never zero.
//!
//! Multi-series indicators (MACD, Bollinger, ADX, Stochastic, Ichimoku) are
//! exposed as separate named instances per line, keeping the single-column
//! `Indicator` trait unchanged.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod ichimoku;
pub mod macd;
pub mod parabolic_sar;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod table;

pub use adx::{Adx, AdxLine};
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use ichimoku::{Ichimoku, IchimokuLine};
pub use macd::{Macd, MacdLine};
pub use parabolic_sar::ParabolicSar;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticLine};
pub use table::{build_indicator_table, indicators_for, IndicatorColumn, IndicatorTable};

use crate::domain::Bar;

/// One indicator column.
///
/// # Look-ahead guard
/// No value at bar t may depend on bars after t. Computing over a truncated
/// history must reproduce the prefix of the full computation.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "SMA_20", "BB_upper_20_2").
    fn name(&self) -> &str;

    /// Number of leading cells that are always absent.
    fn lookback(&self) -> usize;

    /// Compute the column over the full bar history; `len() == bars.len()`.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Rolling mean; absent until `period` consecutive present values are seen.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Apply `f` to every full window of present values ending at each index.
///
/// Windows containing an absent value, and windows where `f` returns `None`,
/// yield an absent cell.
pub fn rolling<F>(values: &[Option<f64>], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }
    let mut window = Vec::with_capacity(period);
    for i in (period - 1)..n {
        window.clear();
        window.extend(values[i + 1 - period..=i].iter().map_while(|v| *v));
        if window.len() == period {
            out[i] = f(&window);
        }
    }
    out
}

/// Exponential smoothing seeded by the SMA of the first `period` present values.
///
/// `out[t] = alpha * x[t] + (1 - alpha) * out[t-1]`. A gap after the seed
/// makes the rest of the column absent.
pub fn seeded_smoothing(values: &[Option<f64>], period: usize, alpha: f64) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 {
        return out;
    }
    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };
    let Some(seed_end) = start.checked_add(period).filter(|&end| end <= n) else {
        return out;
    };
    let mut sum = 0.0;
    for v in &values[start..seed_end] {
        match v {
            Some(x) => sum += x,
            None => return out,
        }
    }
    let mut prev = sum / period as f64;
    out[seed_end - 1] = Some(prev);

    for i in seed_end..n {
        let Some(x) = values[i] else {
            return out;
        };
        prev = alpha * x + (1.0 - alpha) * prev;
        out[i] = Some(prev);
    }
    out
}

/// EMA with `alpha = 2 / (period + 1)`.
pub fn ema_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    seeded_smoothing(values, period, 2.0 / (period as f64 + 1.0))
}

/// Wilder smoothing with `alpha = 1 / period`.
pub fn wilder_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    seeded_smoothing(values, period, 1.0 / period as f64)
}

/// Closes of a bar slice as present cells.
pub(crate) fn closes(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| Some(b.close)).collect()
}

/// Format a float parameter for a column name ("2" rather than "2.0").
pub(crate) fn param(v: f64) -> String {
    format!("{v}")
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev close (or close for the first bar),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Unwrap a present cell and compare within `epsilon`.
#[cfg(test)]
pub fn assert_cell(cell: Option<f64>, expected: f64, epsilon: f64) {
    match cell {
        Some(v) => crate::test_support::assert_approx(v, expected, epsilon),
        None => panic!("expected {expected}, cell is absent"),
    }
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
