//! Bollinger Bands.
//!
//! middle = SMA(period); upper/lower = middle ± multiplier × stdev(period).
//! The stdev is the population stdev over the window.
//! Lookback: period - 1.

use super::{closes, param, rolling, Indicator};
use crate::domain::Bar;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("BB_{label}_{period}_{}", param(multiplier)),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let k = match self.band {
            BollingerBand::Upper => self.multiplier,
            BollingerBand::Middle => 0.0,
            BollingerBand::Lower => -self.multiplier,
        };
        rolling(&closes(bars), self.period, |w| {
            let mean = stats::mean(w);
            if k == 0.0 {
                Some(mean)
            } else {
                Some(mean + k * stats::population_std(w))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_cell, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Bollinger::middle(3, 2.0).compute(&bars);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_cell(result[2], 11.0, DEFAULT_EPSILON);
        assert_cell(result[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_uses_population_stdev() {
        // Window [10, 11, 12]: population stdev = sqrt(2/3)
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        assert_cell(upper[2], 11.0 + 2.0 * (2.0_f64 / 3.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let middle = Bollinger::middle(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);

        for i in 2..5 {
            let half_width = upper[i].unwrap() - middle[i].unwrap();
            assert_cell(Some(middle[i].unwrap() - lower[i].unwrap()), half_width, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        assert_cell(Bollinger::upper(3, 2.0).compute(&bars)[2], 100.0, DEFAULT_EPSILON);
        assert_cell(Bollinger::lower(3, 2.0).compute(&bars)[2], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_names_and_lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
        assert_eq!(Bollinger::upper(20, 2.0).name(), "BB_upper_20_2");
        assert_eq!(Bollinger::lower(20, 2.5).name(), "BB_lower_20_2.5");
    }
}
