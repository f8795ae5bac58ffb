//! finlab CLI: single-instrument and portfolio analysis.
//!
//! Commands:
//! - `analyze <SYMBOL>`: full pipeline for one instrument
//! - `portfolio <SYMBOL>... | --preset NAME`: per-instrument pipelines, correlation,
//!   equal-weight portfolio
//! - `presets`: list the named portfolios

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use finlab_core::data::MarketDataProvider;
use finlab_core::{AnalysisConfig, DateRange, RiskMetricsResult};
use finlab_runner::export::export_json;
use finlab_runner::{
    find_preset, Analyzer, ArtifactStore, CsvDirProvider, IndicatorSet, InstrumentAnalysis,
    PortfolioAnalysis, RunFile, SyntheticProvider, PRESETS,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default analysis start when neither flag nor run file gives one.
const DEFAULT_START: &str = "2022-01-01";

#[derive(Parser)]
#[command(name = "finlab", about = "finlab: financial time-series analytics")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one instrument.
    Analyze {
        /// Ticker, e.g. SPY, EURUSD=X, BTC-USD, ^GSPC.
        symbol: String,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Analyze several instruments and their correlation.
    Portfolio {
        /// Tickers (or use --preset / a run file).
        symbols: Vec<String>,

        /// Named preset (see `finlab presets`).
        #[arg(long)]
        preset: Option<String>,

        /// Run instruments one after another instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// List the named portfolio presets.
    Presets,
}

#[derive(Args)]
struct CommonArgs {
    /// Start date (YYYY-MM-DD, inclusive). Defaults to 2022-01-01.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD, inclusive). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Directory of <SYMBOL>.csv files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Use deterministic synthetic data instead of CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// TOML run file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Annual risk-free rate, e.g. 0.02.
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Add ATR, ADX, Stochastic, Parabolic SAR and Ichimoku to the indicator set.
    #[arg(long, default_value_t = false)]
    extended: bool,

    /// Artifact root directory.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Do not write artifacts.
    #[arg(long, default_value_t = false)]
    no_save: bool,

    /// Print the JSON report to stdout instead of the summary table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze { symbol, common } => run_analyze(&symbol, &common),
        Commands::Portfolio {
            symbols,
            preset,
            sequential,
            common,
        } => run_portfolio(symbols, preset, sequential, &common),
        Commands::Presets => {
            print_presets();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(symbol: &str, common: &CommonArgs) -> Result<()> {
    let run = load_run_file(common)?;
    let config = build_config(common, run.as_ref())?;
    let provider = make_provider(common);

    let analysis = Analyzer::new(provider.as_ref())
        .analyze_single(symbol, &config)
        .with_context(|| format!("analysis of {symbol} failed"))?;

    if common.json {
        println!("{}", export_json(&analysis)?);
    } else {
        print_single(&analysis);
    }
    if !common.no_save {
        let dir = ArtifactStore::new(&common.output_dir).save_single(&analysis)?;
        info!(dir = %dir.display(), "artifacts written");
        eprintln!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

fn run_portfolio(
    symbols: Vec<String>,
    preset: Option<String>,
    sequential: bool,
    common: &CommonArgs,
) -> Result<()> {
    let run = load_run_file(common)?;
    let config = build_config(common, run.as_ref())?;

    let (name, symbols) = match (preset, symbols.is_empty()) {
        (Some(_), false) => bail!("give either symbols or --preset, not both"),
        (Some(name), true) => match find_preset(&name) {
            Some(p) => (p.name.to_string(), p.symbols()),
            None => bail!("unknown preset '{name}' (see `finlab presets`)"),
        },
        (None, false) => (symbols.join("_"), symbols),
        (None, true) => match &run {
            Some(run) => (run.name(), run.symbols()?),
            None => bail!("no symbols given: pass tickers, --preset or --config"),
        },
    };

    let provider = make_provider(common);
    let analysis = Analyzer::new(provider.as_ref())
        .with_parallel(!sequential)
        .analyze_portfolio(&name, &symbols, &config)?;

    if common.json {
        println!("{}", export_json(&analysis)?);
    } else {
        print_portfolio(&analysis);
    }
    if !common.no_save {
        let dir = ArtifactStore::new(&common.output_dir).save_portfolio(&analysis)?;
        info!(dir = %dir.display(), "artifacts written");
        eprintln!("Artifacts saved to: {}", dir.display());
    }

    if analysis.success_count() == 0 {
        bail!("every instrument in '{name}' failed");
    }
    Ok(())
}

fn load_run_file(common: &CommonArgs) -> Result<Option<RunFile>> {
    common.config.as_deref().map(RunFile::from_file).transpose()
}

/// Run file (if any) first, then command-line overrides.
fn build_config(common: &CommonArgs, run: Option<&RunFile>) -> Result<AnalysisConfig> {
    let start = parse_date(common.start.as_deref())?;
    let end = parse_date(common.end.as_deref())?;

    let mut config = match run {
        Some(run) => run.to_config()?,
        None => {
            let start = match start {
                Some(d) => d,
                None => NaiveDate::parse_from_str(DEFAULT_START, "%Y-%m-%d")?,
            };
            let end = end.unwrap_or_else(|| chrono::Local::now().date_naive());
            AnalysisConfig::new(DateRange { start, end })
        }
    };

    if let Some(start) = start {
        config.range.start = start;
    }
    if let Some(end) = end {
        config.range.end = end;
    }
    if let Some(rate) = common.risk_free_rate {
        config.risk_free_rate = rate;
    }
    if common.extended {
        config.indicators = IndicatorSet::Extended.specs();
    }
    config.validate()?;
    Ok(config)
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
    })
    .transpose()
}

fn make_provider(common: &CommonArgs) -> Box<dyn MarketDataProvider> {
    if common.synthetic {
        eprintln!("WARNING: using synthetic data, results are not real market figures");
        Box::new(SyntheticProvider::new())
    } else {
        Box::new(CsvDirProvider::new(&common.data_dir))
    }
}

fn print_presets() {
    for p in PRESETS {
        println!("{:<32} {}", p.name, p.symbols.join(" "));
    }
}

fn risk_header() {
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>8} {:>10}",
        "Symbol", "Total", "Ann.Ret", "Ann.Vol", "Sharpe", "MaxDD"
    );
    println!("{}", "-".repeat(65));
}

fn risk_row(symbol: &str, r: &RiskMetricsResult) {
    println!(
        "{:<12} {:>9.2}% {:>9.2}% {:>9.2}% {:>8.3} {:>9.2}%",
        symbol,
        r.total_return * 100.0,
        r.annualized_return * 100.0,
        r.annualized_volatility * 100.0,
        r.sharpe_ratio,
        r.max_drawdown * 100.0
    );
}

fn print_single(a: &InstrumentAnalysis) {
    println!(
        "{} ({:?}), {} bars, {} to {}",
        a.symbol,
        a.prices.instrument().asset_class,
        a.prices.len(),
        a.prices.first_date(),
        a.prices.last_date()
    );
    println!();
    risk_header();
    risk_row(&a.symbol, &a.risk);
    println!();

    let last = a.indicators.len().saturating_sub(1);
    for col in &a.indicators.columns {
        match col.values.get(last).copied().flatten() {
            Some(v) => println!("{:<24} {:>12.4}", col.name, v),
            None => println!("{:<24} {:>12}", col.name, "n/a"),
        }
    }
}

fn print_portfolio(p: &PortfolioAnalysis) {
    println!(
        "{}: {} of {} instruments, {} to {}",
        p.name,
        p.success_count(),
        p.instruments.len(),
        p.range.start,
        p.range.end
    );
    println!();
    risk_header();
    for a in p.succeeded() {
        risk_row(&a.symbol, &a.risk);
    }
    if let Ok(r) = &p.equal_weight {
        risk_row(finlab_core::portfolio::EQUAL_WEIGHT_SYMBOL, r);
    }

    for (symbol, e) in p.failed() {
        println!("{symbol:<12} FAILED: {e}");
    }

    println!();
    match (&p.correlation, &p.extremes) {
        (Ok(m), Some(ex)) => {
            println!("Correlation over {} common dates", m.observations);
            for pair in &ex.most_negative {
                println!("  - {:<10} {:<10} {:>7.3}", pair.first, pair.second, pair.correlation);
            }
            for pair in &ex.most_positive {
                println!("  + {:<10} {:<10} {:>7.3}", pair.first, pair.second, pair.correlation);
            }
        }
        (Err(e), _) => println!("Correlation unavailable: {e}"),
        (Ok(_), None) => {}
    }
}
