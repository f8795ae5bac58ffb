//! Average True Range (ATR).
//!
//! TR[t] = max(high - low, |high - prev_close|, |low - prev_close|)
//! ATR = Wilder smoothing of TR (alpha = 1/period), seeded by the mean of TR[1..=period].
//! Lookback: period (TR[0] has no previous close and is absent).

use super::{wilder_of, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("ATR_{period}"),
        }
    }
}

/// True range per bar; the first bar is absent.
pub fn true_range(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut tr = vec![None; bars.len()];
    for i in 1..bars.len() {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        tr[i] = Some((h - l).max((h - pc).abs()).max((l - pc).abs()));
    }
    tr
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        wilder_of(&true_range(bars), self.period)
    }
}
