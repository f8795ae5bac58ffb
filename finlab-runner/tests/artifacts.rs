use std::path::Path;

use chrono::NaiveDate;
use finlab_core::data::DataSource;
use finlab_core::{AnalysisConfig, DateRange};
use finlab_runner::{
    load_report, ArtifactStore, Analyzer, CsvDirProvider, InstrumentAnalysis, PortfolioAnalysis,
    RunFile,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Writes `<dir>/<symbol>.csv` with a gently trending series of `n` weekdays.
fn write_csv(dir: &Path, symbol: &str, n: usize, drift: f64) {
    let mut body = String::from("date,open,high,low,close,volume\n");
    let mut date = d(2024, 1, 1);
    let mut close = 100.0;
    let mut written = 0;
    while written < n {
        if chrono::Datelike::weekday(&date).number_from_monday() <= 5 {
            let wiggle = if written % 3 == 0 { -0.4 } else { 0.3 };
            let open = close;
            close *= 1.0 + drift + wiggle / 100.0;
            body.push_str(&format!(
                "{date},{open:.4},{:.4},{:.4},{close:.4},{}\n",
                open.max(close) + 0.5,
                open.min(close) - 0.5,
                1_000 + written
            ));
            written += 1;
        }
        date += chrono::Duration::days(1);
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), body).unwrap();
}

fn config() -> AnalysisConfig {
    AnalysisConfig::new(DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap())
}

#[test]
fn single_artifacts_round_trip() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_csv(data.path(), "SPY", 60, 0.001);

    let provider = CsvDirProvider::new(data.path());
    let a = Analyzer::new(&provider).analyze_single("SPY", &config()).unwrap();
    assert_eq!(a.source, DataSource::CsvFile);

    let dir = ArtifactStore::new(out.path()).save_single(&a).unwrap();
    let name = dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("SPY_"));
    for file in ["report.json", "summary.md", "features.csv", "indicators.csv", "stats.csv"] {
        assert!(dir.join(file).exists(), "missing {file}");
    }

    let features = std::fs::read_to_string(dir.join("features.csv")).unwrap();
    assert_eq!(features.lines().count(), 61);
    assert!(features.lines().next().unwrap().contains("SMA_20"));

    let summary = std::fs::read_to_string(dir.join("summary.md")).unwrap();
    assert!(summary.contains("# Analysis Report: SPY"));
    assert!(summary.contains(&a.dataset_hash));

    let loaded: InstrumentAnalysis = load_report(&dir).unwrap();
    assert_eq!(loaded.symbol, "SPY");
    assert_eq!(loaded.dataset_hash, a.dataset_hash);
    assert_eq!(loaded.features.len(), a.features.len());
    assert!((loaded.risk.sharpe_ratio - a.risk.sharpe_ratio).abs() < 1e-9);
}

#[test]
fn portfolio_artifacts_include_failures() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_csv(data.path(), "AAA", 40, 0.002);
    write_csv(data.path(), "BBB", 40, -0.001);

    let provider = CsvDirProvider::new(data.path());
    let syms = vec!["AAA".to_string(), "BBB".to_string(), "MISSING".to_string()];
    let p = Analyzer::new(&provider)
        .analyze_portfolio("Test Mix", &syms, &config())
        .unwrap();

    let dir = ArtifactStore::new(out.path()).save_portfolio(&p).unwrap();
    assert!(dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("Test_Mix_"));
    for file in ["report.json", "summary.md", "stats.csv", "returns.csv", "correlation.csv"] {
        assert!(dir.join(file).exists(), "missing {file}");
    }
    assert!(dir.join("AAA").join("features.csv").exists());
    assert!(!dir.join("MISSING").exists());

    let stats = std::fs::read_to_string(dir.join("stats.csv")).unwrap();
    assert!(stats.contains("MISSING,instrument_data"));
    assert!(stats.contains("EQUAL_WEIGHT,ok"));

    let summary = std::fs::read_to_string(dir.join("summary.md")).unwrap();
    assert!(summary.contains("2 of 3 instruments"));
    assert!(summary.contains("## Failures"));

    let loaded: PortfolioAnalysis = load_report(&dir).unwrap();
    assert_eq!(loaded.name, "Test Mix");
    assert_eq!(loaded.success_count(), 2);
    assert!(loaded.instruments["MISSING"].is_err());
    assert_eq!(
        loaded.correlation.as_ref().unwrap().symbols,
        p.correlation.as_ref().unwrap().symbols
    );
}

#[test]
fn run_file_drives_portfolio() {
    let data = tempfile::tempdir().unwrap();
    write_csv(data.path(), "AAA", 30, 0.001);
    write_csv(data.path(), "BBB", 30, 0.0005);
    let run_path = data.path().join("run.toml");
    std::fs::write(
        &run_path,
        r#"
[analysis]
name = "pair"
symbols = ["AAA", "BBB"]
start = "2024-01-01"
end = "2024-03-31"
indicator_set = "extended"
"#,
    )
    .unwrap();

    let run = RunFile::from_file(&run_path).unwrap();
    let cfg = run.to_config().unwrap();
    let provider = CsvDirProvider::new(data.path());
    let p = Analyzer::new(&provider)
        .analyze_portfolio(&run.name(), &run.symbols().unwrap(), &cfg)
        .unwrap();

    assert_eq!(p.success_count(), 2);
    let aaa = p.instruments["AAA"].as_ref().unwrap();
    assert!(aaa.indicators.column("ICHI_tenkan_9").is_some());
    assert!(aaa.indicators.column("PSAR_0.02_0.2").is_some());
}
