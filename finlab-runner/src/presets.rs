//! Named instrument sets for portfolio analysis.
//!
//! Tickers use the conventions of common market-data sources: `=X` for FX
//! pairs, `^` for indices, `-USD` for crypto, exchange suffixes for
//! non-US listings.

/// A named list of tickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub symbols: &'static [&'static str],
}

impl Preset {
    pub fn symbols(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.to_string()).collect()
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "Majors_USD",
        symbols: &["EURUSD=X", "GBPUSD=X", "USDJPY=X", "USDCHF=X", "AUDUSD=X"],
    },
    Preset {
        name: "Eurocentrico",
        symbols: &["EURUSD=X", "EURJPY=X", "EURGBP=X", "EURCHF=X", "EURAUD=X"],
    },
    Preset {
        name: "USD_vs_Mundo",
        symbols: &[
            "EURUSD=X", "USDJPY=X", "USDCAD=X", "USDCHF=X", "AUDUSD=X", "NZDUSD=X", "USDSEK=X",
        ],
    },
    Preset {
        name: "Commodity FX",
        symbols: &["AUDUSD=X", "NZDUSD=X", "USDCAD=X", "USDNOK=X", "USDZAR=X"],
    },
    Preset {
        name: "Asia FX",
        symbols: &["USDJPY=X", "USDCNH=X", "USDSGD=X", "USDHKD=X", "USDINR=X"],
    },
    Preset {
        name: "S&P500 Big Tech",
        symbols: &["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA"],
    },
    Preset {
        name: "Bancos USA",
        symbols: &["JPM", "BAC", "C", "WFC", "GS", "MS", "USB"],
    },
    Preset {
        name: "Indices Globales",
        symbols: &["^GSPC", "^DJI", "^IXIC", "^FTSE", "^N225", "^HSI", "^BVSP"],
    },
    Preset {
        name: "ETFs Diversificados",
        symbols: &["SPY", "QQQ", "EEM", "IWM", "VNQ", "TLT", "GLD"],
    },
    Preset {
        name: "Latam Stocks",
        symbols: &["BBD", "PBR", "VALE", "ITUB", "CIB", "EC", "SQM"],
    },
    Preset {
        name: "Crypto Majors (Spot ETF/Stock)",
        symbols: &["BTC-USD", "ETH-USD", "COIN", "MSTR", "RIOT"],
    },
    Preset {
        name: "Energia Global",
        symbols: &["XOM", "CVX", "COP", "BP", "SHEL", "TOT", "ENB"],
    },
    Preset {
        name: "Consumo Defensivo USA",
        symbols: &["PG", "KO", "PEP", "WMT", "COST", "MDLZ", "MO"],
    },
    Preset {
        name: "Europa Blue Chips",
        symbols: &["NESN.SW", "SAP.DE", "OR.PA", "ASML.AS", "NOVN.SW", "SIE.DE", "DAI.DE"],
    },
    Preset {
        name: "Healthcare USA",
        symbols: &["JNJ", "PFE", "UNH", "MRK", "ABT", "LLY", "CVS"],
    },
];

/// Look a preset up by name, ignoring case and treating `_`, `-` and spaces alike.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let wanted = normalize(name);
    PRESETS.iter().find(|p| normalize(p.name) == wanted)
}

pub fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.name).collect()
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
