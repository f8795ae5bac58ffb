//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and average losses, seeded by the mean
//! of the first `period` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; no movement at all → 50.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("RSI_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period == 0 || n <= self.period {
            return result;
        }

        let change = |i: usize| bars[i].close - bars[i - 1].close;

        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for i in 1..=self.period {
            let ch = change(i);
            if ch > 0.0 {
                avg_gain += ch;
            } else {
                avg_loss -= ch;
            }
        }
        avg_gain /= self.period as f64;
        avg_loss /= self.period as f64;
        result[self.period] = Some(rsi_value(avg_gain, avg_loss));

        let alpha = 1.0 / self.period as f64;
        for i in (self.period + 1)..n {
            let ch = change(i);
            let gain = ch.max(0.0);
            let loss = (-ch).max(0.0);
            avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
            result[i] = Some(rsi_value(avg_gain, avg_loss));
        }

        result
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        (100.0 - 100.0 / (1.0 + avg_gain / avg_loss)).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_cell, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_cell(result[3], 100.0, 1e-9);
        assert_cell(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_cell(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let bars = make_bars(&[100.0; 6]);
        let result = Rsi::new(3).compute(&bars);
        assert_cell(result[4], 50.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_seed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // Seed (period 3): avg_gain = 0.34/3, avg_loss = 0.73/3
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[..3].iter().all(Option::is_none));
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_cell(result[3], expected, 1e-9);

        let g = (0.34 / 3.0) * (2.0 / 3.0) + 0.72 / 3.0;
        let l = (0.73 / 3.0) * (2.0 / 3.0);
        assert_cell(result[4], 100.0 - 100.0 / (1.0 + g / l), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_needs_period_plus_one_bars() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        assert!(Rsi::new(3).compute(&bars).iter().all(Option::is_none));
        assert_eq!(Rsi::new(14).lookback(), 14);
    }

    #[test]
    fn huge_period_does_not_overflow() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let rsi = Rsi::new(usize::MAX);
        assert_eq!(rsi.lookback(), usize::MAX);
        assert!(rsi.compute(&bars).iter().all(Option::is_none));
    }
}
