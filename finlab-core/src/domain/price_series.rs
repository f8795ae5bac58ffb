//! PriceSeries: the normalized, immutable bar history of one instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Bar, Instrument};
use crate::config::{DateRange, MissingClosePolicy};
use crate::data::RawBar;
use crate::error::{AnalysisError, AnalysisResult};

/// Ordered daily bars of one instrument.
///
/// Invariants (enforced by every constructor, deserialization included):
/// - dates are strictly increasing, no duplicates
/// - every close is finite and > 0
/// - every bar passes `Bar::is_sane`
/// - at least one bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesParts")]
pub struct PriceSeries {
    instrument: Instrument,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build from already-clean bars, rejecting anything that breaks an invariant.
    pub fn new(instrument: Instrument, bars: Vec<Bar>) -> AnalysisResult<Self> {
        if bars.is_empty() {
            return Err(AnalysisError::instrument(&instrument.symbol, "price series is empty"));
        }
        for (i, bar) in bars.iter().enumerate() {
            if !valid_price(bar.close) {
                return Err(AnalysisError::instrument(
                    &instrument.symbol,
                    format!("invalid close {} on {}", bar.close, bar.date),
                ));
            }
            if !bar.is_sane() {
                return Err(AnalysisError::instrument(
                    &instrument.symbol,
                    format!("inconsistent OHLC on {}", bar.date),
                ));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(AnalysisError::instrument(
                    &instrument.symbol,
                    format!("dates not strictly increasing at {}", bar.date),
                ));
            }
        }
        Ok(Self { instrument, bars })
    }

    /// Normalize raw provider bars into a series for `range`.
    ///
    /// Bars outside the range are dropped, the rest sorted by date with the
    /// first bar kept on duplicate dates. Invalid closes follow `policy`;
    /// invalid open/high/low collapse to the close, and high/low are widened
    /// to cover open and close.
    pub fn from_raw(
        instrument: Instrument,
        mut raw: Vec<RawBar>,
        range: &DateRange,
        policy: MissingClosePolicy,
    ) -> AnalysisResult<Self> {
        let symbol = instrument.symbol.clone();
        raw.retain(|b| range.contains(b.date));
        raw.sort_by_key(|b| b.date);

        let before = raw.len();
        raw.dedup_by_key(|b| b.date);
        let duplicates = before - raw.len();
        if duplicates > 0 {
            warn!(symbol = %symbol, duplicates, "dropped bars with duplicate dates");
        }

        let mut bars: Vec<Bar> = Vec::with_capacity(raw.len());
        let mut filled = 0usize;
        let mut dropped_leading = 0usize;
        let mut repaired = 0usize;

        for rb in raw {
            if !valid_price(rb.close) {
                match policy {
                    MissingClosePolicy::Reject => {
                        return Err(AnalysisError::instrument(
                            &symbol,
                            format!("missing or non-positive close ({}) on {}", rb.close, rb.date),
                        ));
                    }
                    MissingClosePolicy::ForwardFill => match bars.last() {
                        Some(prev) => {
                            bars.push(Bar::flat(rb.date, prev.close, 0));
                            filled += 1;
                        }
                        None => dropped_leading += 1,
                    },
                }
                continue;
            }

            let close = rb.close;
            let or_close = |v: f64| if valid_price(v) { v } else { close };
            let mut bar = Bar {
                date: rb.date,
                open: or_close(rb.open),
                high: or_close(rb.high),
                low: or_close(rb.low),
                close,
                volume: rb.volume,
            };
            if !bar.is_sane() {
                let (o, h, l, c) = (bar.open, bar.high, bar.low, bar.close);
                bar.high = o.max(h).max(l).max(c);
                bar.low = o.min(h).min(l).min(c);
                repaired += 1;
            }
            bars.push(bar);
        }

        if repaired > 0 {
            warn!(symbol = %symbol, repaired, "repaired bars with inconsistent high/low");
        }

        if filled > 0 || dropped_leading > 0 {
            warn!(
                symbol = %symbol,
                filled,
                dropped_leading,
                "forward-filled missing closes"
            );
        }

        if bars.is_empty() {
            return Err(AnalysisError::instrument(
                &symbol,
                format!("no valid bars between {} and {}", range.start, range.end),
            ));
        }

        Self::new(instrument, bars)
    }

    /// Close-only series on consecutive calendar days starting at `first_date`.
    pub fn from_closes(
        instrument: Instrument,
        first_date: NaiveDate,
        closes: &[f64],
    ) -> AnalysisResult<Self> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::flat(first_date + chrono::Duration::days(i as i64), c, 0))
            .collect();
        Self::new(instrument, bars)
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }
}

fn valid_price(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[derive(Deserialize)]
struct SeriesParts {
    instrument: Instrument,
    bars: Vec<Bar>,
}

impl TryFrom<SeriesParts> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(parts: SeriesParts) -> AnalysisResult<Self> {
        Self::new(parts.instrument, parts.bars)
    }
}
