//! finlab runner: orchestration, data collaborators, export.
//!
//! This crate builds on `finlab-core` to provide:
//! - `Analyzer`: single-instrument and portfolio pipelines over a provider
//! - Market-data providers (CSV directory, in-memory, deterministic synthetic)
//! - Named portfolio presets
//! - TOML run files
//! - JSON / CSV / Markdown export and a timestamped artifact store

pub mod config;
pub mod export;
pub mod orchestrator;
pub mod presets;
pub mod provider;

pub use config::{IndicatorSet, RunFile};
pub use export::{load_report, ArtifactStore, Report};
pub use orchestrator::{Analyzer, InstrumentAnalysis, PortfolioAnalysis, EXTREME_PAIRS};
pub use presets::{find_preset, preset_names, Preset, PRESETS};
pub use provider::{CsvDirProvider, InMemoryProvider, SyntheticProvider};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn results_are_send_sync() {
        assert_send::<InstrumentAnalysis>();
        assert_sync::<InstrumentAnalysis>();
        assert_send::<PortfolioAnalysis>();
        assert_sync::<PortfolioAnalysis>();
    }

    #[test]
    fn providers_are_send_sync() {
        assert_send::<CsvDirProvider>();
        assert_sync::<CsvDirProvider>();
        assert_send::<InMemoryProvider>();
        assert_sync::<InMemoryProvider>();
        assert_send::<SyntheticProvider>();
        assert_sync::<SyntheticProvider>();
    }

    #[test]
    fn analyzer_is_sync() {
        assert_sync::<Analyzer<'static>>();
    }
}
