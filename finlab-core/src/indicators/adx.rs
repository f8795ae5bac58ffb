//! ADX: Average Directional Index (Wilder).
//!
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smooth +DM, -DM and TR (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Lookback: period for the DI lines, 2 * period - 1 for ADX.

use super::atr::true_range;
use super::{wilder_of, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdxLine {
    Adx,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    line: AdxLine,
    name: String,
}

impl Adx {
    pub fn new(period: usize, line: AdxLine) -> Self {
        let prefix = match line {
            AdxLine::Adx => "ADX",
            AdxLine::PlusDi => "PLUS_DI",
            AdxLine::MinusDi => "MINUS_DI",
        };
        Self {
            period,
            line,
            name: format!("{prefix}_{period}"),
        }
    }

    pub fn all(period: usize) -> [Self; 3] {
        [
            Self::new(period, AdxLine::Adx),
            Self::new(period, AdxLine::PlusDi),
            Self::new(period, AdxLine::MinusDi),
        ]
    }
}

fn directional_movement(bars: &[Bar]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = bars.len();
    let mut plus_dm = vec![None; n];
    let mut minus_dm = vec![None; n];
    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
    }
    (plus_dm, minus_dm)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            AdxLine::Adx => self.period.saturating_mul(2).saturating_sub(1),
            AdxLine::PlusDi | AdxLine::MinusDi => self.period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let (plus_dm, minus_dm) = directional_movement(bars);
        let smooth_tr = wilder_of(&true_range(bars), self.period);
        let smooth_plus = wilder_of(&plus_dm, self.period);
        let smooth_minus = wilder_of(&minus_dm, self.period);

        let di = |smoothed: &[Option<f64>]| -> Vec<Option<f64>> {
            smoothed
                .iter()
                .zip(&smooth_tr)
                .map(|(dm, tr)| match (dm, tr) {
                    (Some(dm), Some(tr)) if *tr > 0.0 => Some(100.0 * dm / tr),
                    (Some(_), Some(_)) => Some(0.0),
                    _ => None,
                })
                .collect()
        };
        let plus_di = di(&smooth_plus);
        let minus_di = di(&smooth_minus);

        match self.line {
            AdxLine::PlusDi => plus_di,
            AdxLine::MinusDi => minus_di,
            AdxLine::Adx => {
                let dx: Vec<Option<f64>> = plus_di
                    .iter()
                    .zip(&minus_di)
                    .map(|(p, m)| {
                        let (p, m) = ((*p)?, (*m)?);
                        let sum = p + m;
                        Some(if sum == 0.0 {
                            0.0
                        } else {
                            100.0 * (p - m).abs() / sum
                        })
                    })
                    .collect();
                wilder_of(&dx, self.period)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn choppy() -> Vec<Bar> {
        make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ])
    }

    #[test]
    fn adx_and_di_bounds() {
        let bars = choppy();
        for ind in Adx::all(3) {
            for (i, v) in ind.compute(&bars).iter().enumerate() {
                if let Some(v) = v {
                    assert!((0.0..=100.0).contains(v), "{} out of bounds at {i}: {v}", ind.name());
                }
            }
        }
    }

    #[test]
    fn first_values_at_lookback() {
        let bars = choppy();
        for ind in Adx::all(3) {
            let out = ind.compute(&bars);
            let lb = ind.lookback();
            assert!(out[..lb].iter().all(Option::is_none), "{}", ind.name());
            assert!(out[lb].is_some(), "{}", ind.name());
        }
    }

    #[test]
    fn adx_strong_trend_elevated() {
        let data: Vec<_> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let adx = Adx::new(5, AdxLine::Adx).compute(&bars);
        let plus = Adx::new(5, AdxLine::PlusDi).compute(&bars);
        let minus = Adx::new(5, AdxLine::MinusDi).compute(&bars);

        let last = adx.iter().rev().find_map(|v| *v).unwrap();
        assert!(last > 10.0, "ADX should be elevated in strong trend, got {last}");
        assert!(plus[19].unwrap() > minus[19].unwrap());
    }

    #[test]
    fn adx_lookbacks_and_names() {
        let [adx, plus, minus] = Adx::all(14);
        assert_eq!(adx.lookback(), 27);
        assert_eq!(plus.lookback(), 14);
        assert_eq!(minus.name(), "MINUS_DI_14");
    }

    #[test]
    fn adx_too_few_bars() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        assert!(Adx::new(3, AdxLine::Adx).compute(&bars).iter().all(Option::is_none));
    }
}
