//! MACD: Moving Average Convergence/Divergence.
//!
//! line = EMA_fast(close) - EMA_slow(close)
//! signal = EMA_signal(line), seeded on the first `signal` line values
//! histogram = line - signal
//!
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal and histogram.

use super::{closes, ema_of, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        let prefix = match line {
            MacdLine::Line => "MACD",
            MacdLine::Signal => "MACD_signal",
            MacdLine::Histogram => "MACD_hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }

    /// Line, signal and histogram instances for one parameter set.
    pub fn all(fast: usize, slow: usize, signal: usize) -> [Self; 3] {
        [
            Self::new(fast, slow, signal, MacdLine::Line),
            Self::new(fast, slow, signal, MacdLine::Signal),
            Self::new(fast, slow, signal, MacdLine::Histogram),
        ]
    }

    fn macd_line(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let close = closes(bars);
        let fast = ema_of(&close, self.fast);
        let slow = ema_of(&close, self.slow);
        fast.iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect()
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let line = self.slow.max(self.fast).saturating_sub(1);
        match self.line {
            MacdLine::Line => line,
            MacdLine::Signal | MacdLine::Histogram => {
                line.saturating_add(self.signal.saturating_sub(1))
            }
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let line = self.macd_line(bars);
        if self.line == MacdLine::Line {
            return line;
        }
        let signal = ema_of(&line, self.signal);
        match self.line {
            MacdLine::Histogram => line
                .iter()
                .zip(&signal)
                .map(|(l, s)| Some((*l)? - (*s)?))
                .collect(),
            _ => signal,
        }
    }
}
