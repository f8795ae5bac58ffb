//! IndicatorTable: requested indicator columns aligned to a price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Adx, Atr, Bollinger, BollingerBand, Ema, Ichimoku, Indicator, Macd, ParabolicSar, Rsi, Sma,
    Stochastic,
};
use crate::config::IndicatorSpec;
use crate::domain::PriceSeries;
use crate::error::AnalysisResult;

/// One named indicator column; `values.len()` equals the table's date count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Indicator columns for one instrument, row-aligned with its price dates.
///
/// Unrequested indicators are simply not present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTable {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<IndicatorColumn>,
}

impl IndicatorTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Value of column `name` at row `row`; `None` if absent or unknown.
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|c| c.get(row).copied().flatten())
    }
}

/// Expand one indicator request into its column instances.
pub fn indicators_for(spec: &IndicatorSpec) -> Vec<Box<dyn Indicator>> {
    fn boxed<I: Indicator + 'static, const N: usize>(items: [I; N]) -> Vec<Box<dyn Indicator>> {
        items
            .into_iter()
            .map(|i| Box::new(i) as Box<dyn Indicator>)
            .collect()
    }

    match *spec {
        IndicatorSpec::Sma { window } => boxed([Sma::new(window)]),
        IndicatorSpec::Ema { window } => boxed([Ema::new(window)]),
        IndicatorSpec::Rsi { window } => boxed([Rsi::new(window)]),
        IndicatorSpec::Macd { fast, slow, signal } => boxed(Macd::all(fast, slow, signal)),
        IndicatorSpec::Bollinger { window, num_std } => boxed([
            Bollinger::new(window, num_std, BollingerBand::Upper),
            Bollinger::new(window, num_std, BollingerBand::Middle),
            Bollinger::new(window, num_std, BollingerBand::Lower),
        ]),
        IndicatorSpec::Atr { window } => boxed([Atr::new(window)]),
        IndicatorSpec::Adx { window } => boxed(Adx::all(window)),
        IndicatorSpec::Stochastic { window, smooth } => boxed(Stochastic::all(window, smooth)),
        IndicatorSpec::ParabolicSar { step, max_step } => {
            boxed([ParabolicSar::new(step, max_step)])
        }
        IndicatorSpec::Ichimoku {
            conversion,
            base,
            span_b,
        } => boxed(Ichimoku::all(conversion, base, span_b)),
    }
}

/// Compute every requested indicator over `prices`.
///
/// Specs are validated first; an invalid one fails the whole call with
/// `InvalidConfiguration` and no partial table. A history shorter than an
/// indicator's window only leaves that column's cells absent.
pub fn build_indicator_table(
    prices: &PriceSeries,
    specs: &[IndicatorSpec],
) -> AnalysisResult<IndicatorTable> {
    for spec in specs {
        spec.validate()?;
    }

    let bars = prices.bars();
    let mut columns = Vec::new();
    for spec in specs {
        for indicator in indicators_for(spec) {
            let values = indicator.compute(bars);
            debug!(
                symbol = prices.symbol(),
                column = indicator.name(),
                present = values.iter().filter(|v| v.is_some()).count(),
                "computed indicator"
            );
            columns.push(IndicatorColumn {
                name: indicator.name().to_string(),
                values,
            });
        }
    }

    Ok(IndicatorTable {
        symbol: prices.symbol().to_string(),
        dates: prices.dates(),
        columns,
    })
}
