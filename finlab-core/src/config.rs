//! Explicit, validated analysis configuration.
//!
//! Everything the engine recognizes is enumerated here and checked once by
//! `AnalysisConfig::validate()` before any computation starts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

pub const DEFAULT_PERIODS_PER_YEAR: u32 = 252;
pub const DEFAULT_FEATURE_WINDOW: usize = 20;

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AnalysisResult<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.start > self.end {
            return Err(AnalysisError::config(format!(
                "date range is inverted: start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// How the annualized return figure is derived from a return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnualizationMethod {
    /// `(prod(1 + r))^(periods_per_year / n) - 1`
    #[default]
    Geometric,
    /// `(1 + mean(r))^periods_per_year - 1`
    Arithmetic,
}

/// What to do with a missing or non-positive close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingClosePolicy {
    /// Fail the instrument with `InstrumentData`.
    #[default]
    Reject,
    /// Carry the previous valid close forward.
    ForwardFill,
}

/// Largest window any indicator or rolling feature may use (about 40 years of
/// daily bars).
pub const MAX_WINDOW: usize = 10_000;

/// One requested technical indicator with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorSpec {
    Sma { window: usize },
    Ema { window: usize },
    Rsi { window: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    Bollinger { window: usize, num_std: f64 },
    Atr { window: usize },
    Adx { window: usize },
    Stochastic { window: usize, smooth: usize },
    ParabolicSar { step: f64, max_step: f64 },
    Ichimoku { conversion: usize, base: usize, span_b: usize },
}

impl IndicatorSpec {
    /// MACD with the conventional 12/26/9 parameters.
    pub fn macd_default() -> Self {
        IndicatorSpec::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }

    /// Short label used in log lines and error messages.
    pub fn label(&self) -> String {
        match self {
            IndicatorSpec::Sma { window } => format!("SMA({window})"),
            IndicatorSpec::Ema { window } => format!("EMA({window})"),
            IndicatorSpec::Rsi { window } => format!("RSI({window})"),
            IndicatorSpec::Macd { fast, slow, signal } => format!("MACD({fast},{slow},{signal})"),
            IndicatorSpec::Bollinger { window, num_std } => format!("Bollinger({window},{num_std})"),
            IndicatorSpec::Atr { window } => format!("ATR({window})"),
            IndicatorSpec::Adx { window } => format!("ADX({window})"),
            IndicatorSpec::Stochastic { window, smooth } => format!("Stochastic({window},{smooth})"),
            IndicatorSpec::ParabolicSar { step, max_step } => format!("PSAR({step},{max_step})"),
            IndicatorSpec::Ichimoku {
                conversion,
                base,
                span_b,
            } => format!("Ichimoku({conversion},{base},{span_b})"),
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        let label = self.label();
        let positive = |name: &str, v: usize| -> AnalysisResult<()> {
            if v == 0 {
                Err(AnalysisError::config(format!("{label}: {name} must be > 0")))
            } else if v > MAX_WINDOW {
                Err(AnalysisError::config(format!(
                    "{label}: {name} must be <= {MAX_WINDOW}"
                )))
            } else {
                Ok(())
            }
        };
        match *self {
            IndicatorSpec::Sma { window }
            | IndicatorSpec::Ema { window }
            | IndicatorSpec::Rsi { window }
            | IndicatorSpec::Atr { window }
            | IndicatorSpec::Adx { window } => positive("window", window),
            IndicatorSpec::Macd { fast, slow, signal } => {
                positive("fast", fast)?;
                positive("slow", slow)?;
                positive("signal", signal)?;
                if fast >= slow {
                    return Err(AnalysisError::config(format!(
                        "{label}: fast window must be shorter than slow window"
                    )));
                }
                Ok(())
            }
            IndicatorSpec::Bollinger { window, num_std } => {
                positive("window", window)?;
                if !num_std.is_finite() || num_std <= 0.0 {
                    return Err(AnalysisError::config(format!(
                        "{label}: num_std must be a positive finite number"
                    )));
                }
                Ok(())
            }
            IndicatorSpec::Stochastic { window, smooth } => {
                positive("window", window)?;
                positive("smooth", smooth)
            }
            IndicatorSpec::ParabolicSar { step, max_step } => {
                if !step.is_finite() || step <= 0.0 || !max_step.is_finite() || max_step < step {
                    return Err(AnalysisError::config(format!(
                        "{label}: step must be > 0 and max_step >= step"
                    )));
                }
                Ok(())
            }
            IndicatorSpec::Ichimoku {
                conversion,
                base,
                span_b,
            } => {
                positive("conversion", conversion)?;
                positive("base", base)?;
                positive("span_b", span_b)
            }
        }
    }
}

/// Default chart set: moving averages, RSI, MACD and Bollinger bands.
pub fn default_indicators() -> Vec<IndicatorSpec> {
    vec![
        IndicatorSpec::Sma { window: 20 },
        IndicatorSpec::Ema { window: 20 },
        IndicatorSpec::Rsi { window: 14 },
        IndicatorSpec::macd_default(),
        IndicatorSpec::Bollinger {
            window: 20,
            num_std: 2.0,
        },
        IndicatorSpec::Sma { window: 50 },
        IndicatorSpec::Sma { window: 200 },
    ]
}

/// Default set plus the extended trend/momentum panel (ATR, ADX, Stochastic, SAR, Ichimoku).
pub fn extended_indicators() -> Vec<IndicatorSpec> {
    let mut specs = default_indicators();
    specs.extend([
        IndicatorSpec::Atr { window: 14 },
        IndicatorSpec::Adx { window: 14 },
        IndicatorSpec::Stochastic {
            window: 5,
            smooth: 3,
        },
        IndicatorSpec::ParabolicSar {
            step: 0.02,
            max_step: 0.2,
        },
        IndicatorSpec::Ichimoku {
            conversion: 9,
            base: 26,
            span_b: 52,
        },
    ]);
    specs
}

/// Full configuration surface consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub range: DateRange,
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    #[serde(default)]
    pub annualization: AnnualizationMethod,
    #[serde(default)]
    pub missing_close: MissingClosePolicy,
    #[serde(default = "default_indicators")]
    pub indicators: Vec<IndicatorSpec>,
    #[serde(default = "default_feature_window")]
    pub feature_window: usize,
}

fn default_periods_per_year() -> u32 {
    DEFAULT_PERIODS_PER_YEAR
}

fn default_feature_window() -> usize {
    DEFAULT_FEATURE_WINDOW
}

impl AnalysisConfig {
    /// Config with the default indicator set and conventions for a date range.
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            risk_free_rate: 0.0,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            annualization: AnnualizationMethod::default(),
            missing_close: MissingClosePolicy::default(),
            indicators: default_indicators(),
            feature_window: DEFAULT_FEATURE_WINDOW,
        }
    }

    pub fn with_indicators(mut self, indicators: Vec<IndicatorSpec>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn with_annualization(mut self, method: AnnualizationMethod) -> Self {
        self.annualization = method;
        self
    }

    pub fn with_missing_close(mut self, policy: MissingClosePolicy) -> Self {
        self.missing_close = policy;
        self
    }

    /// Validate every recognized option. Called once at entry.
    pub fn validate(&self) -> AnalysisResult<()> {
        self.range.validate()?;
        if self.periods_per_year == 0 {
            return Err(AnalysisError::config("periods_per_year must be > 0"));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(AnalysisError::config("risk_free_rate must be finite"));
        }
        if !(2..=MAX_WINDOW).contains(&self.feature_window) {
            return Err(AnalysisError::config(format!(
                "feature_window must be between 2 and {MAX_WINDOW}"
            )));
        }
        for (i, spec) in self.indicators.iter().enumerate() {
            spec.validate()?;
            if self.indicators[..i].contains(spec) {
                return Err(AnalysisError::config(format!(
                    "indicator {} requested more than once",
                    spec.label()
                )));
            }
        }
        Ok(())
    }

    pub fn risk_params(&self) -> crate::risk::RiskParams {
        crate::risk::RiskParams {
            periods_per_year: self.periods_per_year,
            risk_free_rate: self.risk_free_rate,
            annualization: self.annualization,
        }
    }
}
