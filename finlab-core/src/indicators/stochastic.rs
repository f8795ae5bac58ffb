//! Stochastic oscillator.
//!
//! %K = 100 * (close - LL) / (HH - LL) over the last `window` bars.
//! %D = SMA_smooth(%K).
//! A flat window (HH == LL) leaves %K absent for that bar.
//! Lookback: window - 1 for %K, window + smooth - 2 for %D.

use super::{rolling_mean, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    window: usize,
    smooth: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(window: usize, smooth: usize, line: StochasticLine) -> Self {
        let prefix = match line {
            StochasticLine::K => "STOCH_K",
            StochasticLine::D => "STOCH_D",
        };
        Self {
            window,
            smooth,
            line,
            name: format!("{prefix}_{window}_{smooth}"),
        }
    }

    pub fn all(window: usize, smooth: usize) -> [Self; 2] {
        [
            Self::new(window, smooth, StochasticLine::K),
            Self::new(window, smooth, StochasticLine::D),
        ]
    }

    fn percent_k(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut k = vec![None; n];
        if self.window == 0 || n < self.window {
            return k;
        }
        for i in (self.window - 1)..n {
            let window = &bars[i + 1 - self.window..=i];
            let hh = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let ll = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let range = hh - ll;
            if range > 0.0 {
                k[i] = Some((100.0 * (bars[i].close - ll) / range).clamp(0.0, 100.0));
            }
        }
        k
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.window.saturating_sub(1);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k.saturating_add(self.smooth.saturating_sub(1)),
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let k = self.percent_k(bars);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => rolling_mean(&k, self.smooth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_cell, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn percent_k_known_values() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 8.0, 11.0),
            (11.0, 14.0, 10.0, 13.0),
            (13.0, 13.5, 9.0, 10.0),
            (10.0, 11.0, 9.5, 11.0),
        ]);
        let k = Stochastic::new(3, 2, StochasticLine::K).compute(&bars);
        assert!(k[0].is_none() && k[1].is_none());
        // HH 14, LL 8, close 10 → 100 * 2 / 6
        assert_cell(k[2], 100.0 / 3.0, DEFAULT_EPSILON);
        // HH 14, LL 9, close 11 → 100 * 2 / 5
        assert_cell(k[3], 40.0, DEFAULT_EPSILON);

        let d = Stochastic::new(3, 2, StochasticLine::D).compute(&bars);
        assert!(d[2].is_none());
        assert_cell(d[3], (100.0 / 3.0 + 40.0) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_is_absent() {
        let bars = make_ohlc_bars(&[(5.0, 5.0, 5.0, 5.0); 4]);
        let k = Stochastic::new(2, 1, StochasticLine::K).compute(&bars);
        assert!(k.iter().all(Option::is_none));
    }

    #[test]
    fn stochastic_lookbacks() {
        let [k, d] = Stochastic::all(5, 3);
        assert_eq!(k.lookback(), 4);
        assert_eq!(d.lookback(), 6);
        assert_eq!(d.name(), "STOCH_D_5_3");
    }
}
