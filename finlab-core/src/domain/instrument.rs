use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Broad asset class of a traded instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Equity,
    Forex,
    Crypto,
    Index,
}

impl AssetClass {
    /// Infer the asset class from provider ticker conventions.
    ///
    /// `EURUSD=X` is forex, `^GSPC` an index, `BTC-USD` crypto, anything else equity.
    pub fn infer(symbol: &str) -> Self {
        const CRYPTO_QUOTES: [&str; 4] = ["-USD", "-USDT", "-EUR", "-BTC"];
        if symbol.starts_with('^') {
            AssetClass::Index
        } else if symbol.ends_with("=X") {
            AssetClass::Forex
        } else if CRYPTO_QUOTES.iter().any(|q| symbol.ends_with(q)) {
            AssetClass::Crypto
        } else {
            AssetClass::Equity
        }
    }
}

/// A tradable asset identified by its ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub asset_class: AssetClass,
}

impl Instrument {
    /// Create an instrument, inferring the asset class from the ticker.
    pub fn new(symbol: impl AsRef<str>) -> AnalysisResult<Self> {
        let symbol = symbol.as_ref().trim();
        if symbol.is_empty() {
            return Err(AnalysisError::config("instrument symbol must not be empty"));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            asset_class: AssetClass::infer(symbol),
        })
    }

    pub fn with_class(symbol: impl Into<String>, asset_class: AssetClass) -> Self {
        Self {
            symbol: symbol.into(),
            asset_class,
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol)
    }
}
