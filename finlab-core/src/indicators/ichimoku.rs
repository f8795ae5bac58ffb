//! Ichimoku cloud lines.
//!
//! tenkan  = midpoint of HH/LL over `conversion` bars
//! kijun   = midpoint of HH/LL over `base` bars
//! senkou A = (tenkan + kijun) / 2
//! senkou B = midpoint of HH/LL over `span_b` bars
//!
//! Values are dated on the bar they are computed from; the cloud is not
//! displaced forward.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuLine {
    Tenkan,
    Kijun,
    SenkouA,
    SenkouB,
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    conversion: usize,
    base: usize,
    span_b: usize,
    line: IchimokuLine,
    name: String,
}

impl Ichimoku {
    pub fn new(conversion: usize, base: usize, span_b: usize, line: IchimokuLine) -> Self {
        let name = match line {
            IchimokuLine::Tenkan => format!("ICHI_tenkan_{conversion}"),
            IchimokuLine::Kijun => format!("ICHI_kijun_{base}"),
            IchimokuLine::SenkouA => format!("ICHI_senkou_a_{conversion}_{base}"),
            IchimokuLine::SenkouB => format!("ICHI_senkou_b_{span_b}"),
        };
        Self {
            conversion,
            base,
            span_b,
            line,
            name,
        }
    }

    pub fn all(conversion: usize, base: usize, span_b: usize) -> [Self; 4] {
        [
            Self::new(conversion, base, span_b, IchimokuLine::Tenkan),
            Self::new(conversion, base, span_b, IchimokuLine::Kijun),
            Self::new(conversion, base, span_b, IchimokuLine::SenkouA),
            Self::new(conversion, base, span_b, IchimokuLine::SenkouB),
        ]
    }
}

/// Midpoint of the highest high and lowest low over the trailing `period` bars.
fn midpoint(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let hh = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let ll = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        out[i] = Some((hh + ll) / 2.0);
    }
    out
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let period = match self.line {
            IchimokuLine::Tenkan => self.conversion,
            IchimokuLine::Kijun => self.base,
            IchimokuLine::SenkouA => self.conversion.max(self.base),
            IchimokuLine::SenkouB => self.span_b,
        };
        period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        match self.line {
            IchimokuLine::Tenkan => midpoint(bars, self.conversion),
            IchimokuLine::Kijun => midpoint(bars, self.base),
            IchimokuLine::SenkouB => midpoint(bars, self.span_b),
            IchimokuLine::SenkouA => {
                let tenkan = midpoint(bars, self.conversion);
                let kijun = midpoint(bars, self.base);
                tenkan
                    .iter()
                    .zip(&kijun)
                    .map(|(t, k)| Some(((*t)? + (*k)?) / 2.0))
                    .collect()
            }
        }
    }
}
