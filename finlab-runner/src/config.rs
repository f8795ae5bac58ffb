//! TOML run files.
//!
//! ```toml
//! [analysis]
//! name = "big-tech"
//! preset = "S&P500 Big Tech"   # or: symbols = ["AAPL", "MSFT"]
//! start = "2022-01-01"
//! end = "2024-12-31"
//! risk_free_rate = 0.02
//! annualization = "geometric"
//! missing_close = "forward_fill"
//! feature_window = 20
//! indicator_set = "extended"   # "default" when omitted
//!
//! [[indicators]]               # replaces the indicator set when present
//! type = "SMA"
//! window = 20
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use finlab_core::config::{DEFAULT_FEATURE_WINDOW, DEFAULT_PERIODS_PER_YEAR};
use finlab_core::{
    default_indicators, extended_indicators, AnalysisConfig, AnnualizationMethod, DateRange,
    IndicatorSpec, MissingClosePolicy,
};
use serde::{Deserialize, Serialize};

use crate::presets::find_preset;

/// Built-in indicator bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSet {
    #[default]
    Default,
    Extended,
}

impl IndicatorSet {
    pub fn specs(self) -> Vec<IndicatorSpec> {
        match self {
            Self::Default => default_indicators(),
            Self::Extended => extended_indicators(),
        }
    }
}

/// `[analysis]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub preset: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    #[serde(default)]
    pub annualization: AnnualizationMethod,
    #[serde(default)]
    pub missing_close: MissingClosePolicy,
    #[serde(default = "default_feature_window")]
    pub feature_window: usize,
    #[serde(default)]
    pub indicator_set: IndicatorSet,
}

fn default_periods_per_year() -> u32 {
    DEFAULT_PERIODS_PER_YEAR
}

fn default_feature_window() -> usize {
    DEFAULT_FEATURE_WINDOW
}

/// A parsed run file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub indicators: Vec<IndicatorSpec>,
}

impl RunFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse run file TOML")
    }

    /// Validated engine configuration.
    pub fn to_config(&self) -> Result<AnalysisConfig> {
        let a = &self.analysis;
        let indicators = if self.indicators.is_empty() {
            a.indicator_set.specs()
        } else {
            self.indicators.clone()
        };
        let config = AnalysisConfig {
            range: DateRange {
                start: a.start,
                end: a.end,
            },
            risk_free_rate: a.risk_free_rate,
            periods_per_year: a.periods_per_year,
            annualization: a.annualization,
            missing_close: a.missing_close,
            indicators,
            feature_window: a.feature_window,
        };
        config.validate().context("invalid run file configuration")?;
        Ok(config)
    }

    /// Requested symbols, from the explicit list or the named preset.
    pub fn symbols(&self) -> Result<Vec<String>> {
        let a = &self.analysis;
        match (&a.preset, a.symbols.is_empty()) {
            (Some(_), false) => bail!("run file sets both `symbols` and `preset`"),
            (Some(name), true) => match find_preset(name) {
                Some(p) => Ok(p.symbols()),
                None => bail!("unknown preset '{name}'"),
            },
            (None, false) => Ok(a.symbols.clone()),
            (None, true) => bail!("run file needs `symbols` or `preset`"),
        }
    }

    /// Display name: explicit, else the preset name, else the joined symbols.
    pub fn name(&self) -> String {
        let a = &self.analysis;
        a.name
            .clone()
            .or_else(|| a.preset.clone())
            .unwrap_or_else(|| a.symbols.join("_"))
    }
}
