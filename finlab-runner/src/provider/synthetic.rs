//! Deterministic synthetic bars for development and demos.
//!
//! A random walk from 100.0 seeded by the BLAKE3 hash of the symbol, so the
//! same symbol and range always produce the same bars. Weekends are skipped.
//! Results built on this data are tagged `DataSource::Synthetic`.

use chrono::{Datelike, NaiveDate, Weekday};
use finlab_core::data::{DataError, DataSource, MarketDataProvider, RawBar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::within_range;

/// Upper bound on the daily return half-width; keeps every close positive.
pub const MAX_DAILY_RANGE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct SyntheticProvider {
    start_price: f64,
    /// Half-width of the uniform daily return.
    daily_range: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            daily_range: 0.03,
        }
    }
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the daily return half-width, clamped to `[0, MAX_DAILY_RANGE]`.
    pub fn with_daily_range(mut self, daily_range: f64) -> Self {
        self.daily_range = if daily_range.is_finite() {
            daily_range.abs().min(MAX_DAILY_RANGE)
        } else {
            0.0
        };
        self
    }

    /// Generate bars for every weekday in `[start, end]`.
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = if self.daily_range > 0.0 {
                rng.gen_range(-self.daily_range..self.daily_range)
            } else {
                0.0
            };
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(RawBar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        within_range(symbol, self.generate(symbol, start, end), start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let p = SyntheticProvider::new();
        let a = p.generate("SPY", d(1, 1), d(1, 31));
        let b = p.generate("SPY", d(1, 1), d(1, 31));
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_differ() {
        let p = SyntheticProvider::new();
        let spy = p.generate("SPY", d(1, 1), d(1, 31));
        let qqq = p.generate("QQQ", d(1, 1), d(1, 31));
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }

    #[test]
    fn weekdays_only_with_sane_ohlc() {
        let bars = SyntheticProvider::new().generate("X", d(1, 1), d(3, 31));
        for b in &bars {
            assert!(!matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(b.close > 0.0);
            assert!(b.high >= b.open.max(b.close));
            assert!(b.low <= b.open.min(b.close));
        }
    }

    #[test]
    fn weekend_only_range_is_empty() {
        // 2024-01-06/07 is a Saturday/Sunday.
        let err = SyntheticProvider::new().fetch("X", d(1, 6), d(1, 7)).unwrap_err();
        assert!(matches!(err, DataError::Empty { .. }));
    }

    #[test]
    fn zero_range_is_flat() {
        let bars = SyntheticProvider::new()
            .with_daily_range(0.0)
            .generate("X", d(1, 1), d(1, 12));
        assert!(bars.iter().all(|b| b.close == 100.0));
    }

    #[test]
    fn oversized_range_is_clamped() {
        let p = SyntheticProvider::new().with_daily_range(5.0);
        assert_eq!(p.daily_range, MAX_DAILY_RANGE);
        let bars = p.generate("VOLATILE", d(1, 1), d(12, 31));
        assert!(bars.iter().all(|b| b.close > 0.0 && b.low > 0.0));

        let nan = SyntheticProvider::new().with_daily_range(f64::NAN);
        assert_eq!(nan.daily_range, 0.0);
    }
}
