//! Parabolic SAR: Wilder's acceleration factor system.
//!
//! Sequential and stateful: tracks direction, extreme point (EP) and
//! acceleration factor (AF). AF starts at `step`, grows by `step` on each new
//! extreme and is capped at `max_step`.
//! Lookback: 1 (the first bar only seeds direction).

use super::{param, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    step: f64,
    max_step: f64,
    name: String,
}

impl ParabolicSar {
    pub fn new(step: f64, max_step: f64) -> Self {
        Self {
            step,
            max_step,
            name: format!("PSAR_{}_{}", param(step), param(max_step)),
        }
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new(0.02, 0.2)
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];
        if n < 2 {
            return result;
        }

        let mut is_long = bars[1].close >= bars[0].close;
        let mut af = self.step;
        let (mut sar, mut ep) = if is_long {
            (bars[0].low, bars[1].high)
        } else {
            (bars[0].high, bars[1].low)
        };
        result[1] = Some(sar);

        for i in 2..n {
            let bar = &bars[i];
            let mut next = sar + af * (ep - sar);

            if is_long {
                // SAR may not sit above either of the two previous lows.
                next = next.min(bars[i - 1].low).min(bars[i - 2].low);
                if bar.low < next {
                    is_long = false;
                    next = ep;
                    ep = bar.low;
                    af = self.step;
                } else if bar.high > ep {
                    ep = bar.high;
                    af = (af + self.step).min(self.max_step);
                }
            } else {
                next = next.max(bars[i - 1].high).max(bars[i - 2].high);
                if bar.high > next {
                    is_long = true;
                    next = ep;
                    ep = bar.high;
                    af = self.step;
                } else if bar.low < ep {
                    ep = bar.low;
                    af = (af + self.step).min(self.max_step);
                }
            }

            sar = next;
            result[i] = Some(sar);
        }

        result
    }
}
