//! Reporting and export: JSON, CSV, and Markdown artifacts.
//!
//! - **JSON**: the full analysis inside a versioned envelope, round-trippable
//! - **CSV**: feature table, indicator table, aligned returns, correlation
//!   matrix, per-instrument statistics
//! - **Markdown**: human-readable summaries
//!
//! `ArtifactStore` writes these into `<root>/<name>_<YYYYmmdd_HHMMSS>/`.
//! Absent cells are written as empty CSV fields.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use finlab_core::data::{align_inner, DataSource};
use finlab_core::portfolio::EQUAL_WEIGHT_SYMBOL;
use finlab_core::{
    AnalysisError, CorrelationMatrix, FeatureTable, IndicatorTable, ReturnSeries,
    RiskMetricsResult,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::orchestrator::{InstrumentAnalysis, PortfolioAnalysis};

/// Version of the JSON report layout.
pub const SCHEMA_VERSION: u32 = 1;

// ─── JSON export ────────────────────────────────────────────────────

/// JSON envelope around an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<T> {
    pub schema_version: u32,
    pub generated_at: String,
    pub analysis: T,
}

impl<T> Report<T> {
    pub fn new(analysis: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: chrono::Local::now().to_rfc3339(),
            analysis,
        }
    }
}

/// Serialize an analysis to pretty JSON inside a `Report` envelope.
pub fn export_json<T: Serialize>(analysis: &T) -> Result<String> {
    serde_json::to_string_pretty(&Report::new(analysis)).context("failed to serialize report to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_json<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T> {
    let report: Report<T> =
        serde_json::from_str(json).context("failed to deserialize report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report.analysis)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.8}")).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per date: prices, returns, indicators, rolling statistics,
/// drawdown and the broadcast instrument risk figures.
pub fn export_features_csv(table: &FeatureTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec![
        "symbol",
        "date",
        "close",
        "volume",
        "simple_return",
        "log_return",
    ];
    header.extend(table.indicator_names.iter().map(String::as_str));
    header.extend([
        "rolling_volatility",
        "rolling_sharpe",
        "var_5",
        "expected_shortfall",
        "skew",
        "kurtosis",
        "drawdown",
        "total_return",
        "annualized_return",
        "annualized_volatility",
        "sharpe_ratio",
        "max_drawdown",
    ]);
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut rec = vec![
            row.symbol.clone(),
            row.date.to_string(),
            cell(Some(row.close)),
            row.volume.to_string(),
            cell(row.simple_return),
            cell(row.log_return),
        ];
        rec.extend(row.indicators.iter().map(|v| cell(*v)));
        let r = &row.rolling;
        rec.extend(
            [
                r.volatility,
                r.sharpe,
                r.var_5,
                r.expected_shortfall,
                r.skew,
                r.kurtosis,
                Some(row.drawdown),
                Some(row.risk.total_return),
                Some(row.risk.annualized_return),
                Some(row.risk.annualized_volatility),
                Some(row.risk.sharpe_ratio),
                Some(row.risk.max_drawdown),
            ]
            .into_iter()
            .map(cell),
        );
        wtr.write_record(&rec)?;
    }

    finish(wtr)
}

/// Date column followed by one column per indicator line.
pub fn export_indicators_csv(table: &IndicatorTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date"];
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    for (i, date) in table.dates.iter().enumerate() {
        let mut rec = vec![date.to_string()];
        rec.extend(table.columns.iter().map(|c| cell(c.values[i])));
        wtr.write_record(&rec)?;
    }
    finish(wtr)
}

/// Simple returns of every series on their common dates.
pub fn export_returns_csv(series: &BTreeMap<String, ReturnSeries>) -> Result<String> {
    let aligned = align_inner(series);
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date"];
    header.extend(aligned.symbols.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (i, date) in aligned.dates.iter().enumerate() {
        let mut rec = vec![date.to_string()];
        rec.extend(aligned.values.iter().map(|col| cell(Some(col[i]))));
        wtr.write_record(&rec)?;
    }
    finish(wtr)
}

/// Square matrix with a leading `symbol` column.
pub fn export_correlation_csv(matrix: &CorrelationMatrix) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["symbol"];
    header.extend(matrix.symbols.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (symbol, row) in matrix.symbols.iter().zip(&matrix.matrix) {
        let mut rec = vec![symbol.clone()];
        rec.extend(row.iter().map(|v| format!("{v:.6}")));
        wtr.write_record(&rec)?;
    }
    finish(wtr)
}

/// Headline statistics per instrument; failed instruments keep their error.
pub fn export_stats_csv<'a, I>(rows: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, Result<&'a RiskMetricsResult, &'a AnalysisError>)>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "status",
        "observations",
        "total_return",
        "annualized_return",
        "annualized_volatility",
        "sharpe_ratio",
        "max_drawdown",
        "error",
    ])?;

    for (symbol, result) in rows {
        match result {
            Ok(r) => wtr.write_record([
                symbol.to_string(),
                "ok".to_string(),
                r.observations.to_string(),
                cell(Some(r.total_return)),
                cell(Some(r.annualized_return)),
                cell(Some(r.annualized_volatility)),
                cell(Some(r.sharpe_ratio)),
                cell(Some(r.max_drawdown)),
                String::new(),
            ])?,
            Err(e) => {
                let mut rec = vec![symbol.to_string(), e.kind().to_string()];
                rec.extend(std::iter::repeat(String::new()).take(6));
                rec.push(e.to_string());
                wtr.write_record(&rec)?;
            }
        }
    }
    finish(wtr)
}

fn portfolio_stats_csv(p: &PortfolioAnalysis) -> Result<String> {
    let rows = p
        .instruments
        .iter()
        .map(|(s, r)| (s.as_str(), r.as_ref().map(|a| &a.risk)))
        .chain(std::iter::once((EQUAL_WEIGHT_SYMBOL, p.equal_weight.as_ref())));
    export_stats_csv(rows)
}

// ─── Markdown reports ───────────────────────────────────────────────

fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

fn source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::CsvFile => "CSV file",
        DataSource::InMemory => "in-memory",
        DataSource::Synthetic => "**SYNTHETIC**",
    }
}

fn risk_table(md: &mut String, r: &RiskMetricsResult) {
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Observations | {} |\n", r.observations));
    md.push_str(&format!("| Total Return | {} |\n", pct(r.total_return)));
    md.push_str(&format!(
        "| Annualized Return ({:?}) | {} |\n",
        r.annualization,
        pct(r.annualized_return)
    ));
    md.push_str(&format!(
        "| Annualized Volatility | {} |\n",
        pct(r.annualized_volatility)
    ));
    md.push_str(&format!("| Sharpe Ratio | {:.3} |\n", r.sharpe_ratio));
    md.push_str(&format!("| Max Drawdown | {} |\n", pct(r.max_drawdown)));
    md.push_str(&format!("| Risk-free Rate | {} |\n", pct(r.risk_free_rate)));
    md.push('\n');
}

/// Markdown summary of one instrument.
pub fn single_summary(a: &InstrumentAnalysis) -> String {
    let mut md = String::with_capacity(2048);
    md.push_str(&format!("# Analysis Report: {}\n\n", a.symbol));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Asset Class | {:?} |\n",
        a.prices.instrument().asset_class
    ));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        a.prices.first_date(),
        a.prices.last_date()
    ));
    md.push_str(&format!("| Bars | {} |\n", a.prices.len()));
    md.push_str(&format!("| Data | {} |\n", source_label(a.source)));
    md.push_str(&format!("| Dataset Hash | {} |\n", a.dataset_hash));
    md.push('\n');

    md.push_str("## Risk\n\n");
    risk_table(&mut md, &a.risk);

    md.push_str("## Latest Indicators\n\n");
    let last = a.indicators.len().saturating_sub(1);
    if a.indicators.columns.is_empty() {
        md.push_str("_No indicators requested._\n");
    } else {
        md.push_str("| Indicator | Value |\n");
        md.push_str("| --- | --- |\n");
        for col in &a.indicators.columns {
            let v = col
                .values
                .get(last)
                .copied()
                .flatten()
                .map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
            md.push_str(&format!("| {} | {} |\n", col.name, v));
        }
    }
    md
}

/// Markdown summary of a portfolio request.
pub fn portfolio_summary(p: &PortfolioAnalysis) -> String {
    let mut md = String::with_capacity(4096);
    md.push_str(&format!("# Portfolio Report: {}\n\n", p.name));
    md.push_str(&format!(
        "Period {} to {}, {} of {} instruments analyzed.\n\n",
        p.range.start,
        p.range.end,
        p.success_count(),
        p.instruments.len()
    ));

    md.push_str("## Instruments\n\n");
    md.push_str("| Symbol | Total Return | Ann. Return | Ann. Volatility | Sharpe | Max DD |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- |\n");
    for a in p.succeeded() {
        let r = &a.risk;
        md.push_str(&format!(
            "| {} | {} | {} | {} | {:.3} | {} |\n",
            a.symbol,
            pct(r.total_return),
            pct(r.annualized_return),
            pct(r.annualized_volatility),
            r.sharpe_ratio,
            pct(r.max_drawdown)
        ));
    }
    md.push('\n');

    let failures: Vec<_> = p.failed().collect();
    if !failures.is_empty() {
        md.push_str("## Failures\n\n");
        for (symbol, e) in failures {
            md.push_str(&format!("- **{symbol}** ({}): {e}\n", e.kind()));
        }
        md.push('\n');
    }

    md.push_str("## Equal-Weight Portfolio\n\n");
    match &p.equal_weight {
        Ok(r) => risk_table(&mut md, r),
        Err(e) => md.push_str(&format!("_Unavailable: {e}_\n\n")),
    }

    md.push_str("## Correlation\n\n");
    match (&p.correlation, &p.extremes) {
        (Ok(m), Some(ex)) => {
            md.push_str(&format!(
                "{} common dates, {} to {}.\n\n",
                m.observations, m.start, m.end
            ));
            md.push_str("Most negative:\n\n");
            for pair in &ex.most_negative {
                md.push_str(&format!(
                    "- {} / {}: {:.3}\n",
                    pair.first, pair.second, pair.correlation
                ));
            }
            md.push_str("\nMost positive:\n\n");
            for pair in &ex.most_positive {
                md.push_str(&format!(
                    "- {} / {}: {:.3}\n",
                    pair.first, pair.second, pair.correlation
                ));
            }
        }
        (Err(e), _) => md.push_str(&format!("_Unavailable: {e}_\n")),
        (Ok(_), None) => {}
    }
    md
}

// ─── Artifact store ─────────────────────────────────────────────────

/// Writes analysis artifacts under a root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save one instrument:
    /// `report.json`, `summary.md`, `features.csv`, `indicators.csv`, `stats.csv`.
    ///
    /// Returns the created directory.
    pub fn save_single(&self, a: &InstrumentAnalysis) -> Result<PathBuf> {
        let dir = self.run_dir(&a.symbol)?;
        write(&dir, "report.json", &export_json(a)?)?;
        write(&dir, "summary.md", &single_summary(a))?;
        write_instrument_tables(&dir, a)?;
        write(
            &dir,
            "stats.csv",
            &export_stats_csv([(a.symbol.as_str(), Ok(&a.risk))])?,
        )?;
        info!(symbol = %a.symbol, dir = %dir.display(), "artifacts saved");
        Ok(dir)
    }

    /// Save a portfolio: `report.json`, `summary.md`, `stats.csv`,
    /// `returns.csv`, `correlation.csv` (when available) and one
    /// subdirectory of tables per successful instrument.
    pub fn save_portfolio(&self, p: &PortfolioAnalysis) -> Result<PathBuf> {
        let dir = self.run_dir(&p.name)?;
        write(&dir, "report.json", &export_json(p)?)?;
        write(&dir, "summary.md", &portfolio_summary(p))?;
        write(&dir, "stats.csv", &portfolio_stats_csv(p)?)?;

        let returns: BTreeMap<String, ReturnSeries> = p
            .succeeded()
            .map(|a| (a.symbol.clone(), a.returns.clone()))
            .collect();
        write(&dir, "returns.csv", &export_returns_csv(&returns)?)?;
        if let Ok(m) = &p.correlation {
            write(&dir, "correlation.csv", &export_correlation_csv(m)?)?;
        }

        for a in p.succeeded() {
            let sub = dir.join(sanitize(&a.symbol));
            std::fs::create_dir_all(&sub)
                .with_context(|| format!("failed to create {}", sub.display()))?;
            write_instrument_tables(&sub, a)?;
        }
        info!(portfolio = %p.name, dir = %dir.display(), "artifacts saved");
        Ok(dir)
    }

    fn run_dir(&self, name: &str) -> Result<PathBuf> {
        let dirname = format!(
            "{}_{}",
            sanitize(name),
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let dir = self.root.join(dirname);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create artifact dir: {}", dir.display()))?;
        Ok(dir)
    }
}

/// Load the analysis stored in an artifact directory's `report.json`.
pub fn load_report<T: for<'de> Deserialize<'de>>(dir: &Path) -> Result<T> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_instrument_tables(dir: &Path, a: &InstrumentAnalysis) -> Result<()> {
    write(dir, "features.csv", &export_features_csv(&a.features)?)?;
    write(dir, "indicators.csv", &export_indicators_csv(&a.indicators)?)
}

fn write(dir: &Path, file: &str, content: &str) -> Result<()> {
    let path = dir.join(file);
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// File-system-safe name: anything outside `[A-Za-z0-9._=^-]` becomes `_`.
fn sanitize(name: &str) -> String {
    let s: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '=' | '^' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() || s.chars().all(|c| c == '.') {
        "analysis".to_string()
    } else {
        s
    }
}
