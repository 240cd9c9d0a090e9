pub mod check;
pub mod list;
pub mod play;
pub mod show;

use std::path::{Path, PathBuf};

use colored::Colorize;
use tt_core::{DirSource, LoadReport, ScenarioStore};
use tt_session::SessionConfig;

/// Load every scenario in `dir` and print skipped files and warnings.
fn load_dir(dir: &Path) -> Result<(ScenarioStore, LoadReport), String> {
    let source = DirSource::new(dir);
    let (store, report) = ScenarioStore::load(&source).map_err(|e| e.to_string())?;
    print_report(&report);
    Ok((store, report))
}

/// Print load problems to stderr.
fn print_report(report: &LoadReport) {
    for skipped in &report.skipped {
        eprintln!(
            "  {} {}: {}",
            "skipped".red().bold(),
            skipped.file,
            skipped.reason
        );
    }
    for warning in &report.warnings {
        eprintln!(
            "  {} {}: {}",
            "warning".yellow().bold(),
            warning.file,
            warning.message
        );
    }
}

/// Read the session config file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig, String> {
    match path {
        Some(path) => SessionConfig::from_toml_file(path).map_err(|e| e.to_string()),
        None => Ok(SessionConfig::default()),
    }
}

/// Command-line flags win over the config file.
pub fn apply_overrides(
    mut config: SessionConfig,
    learner: Option<String>,
    difficulty: Option<String>,
    records: Option<PathBuf>,
) -> SessionConfig {
    if let Some(learner) = learner {
        config = config.with_learner(learner);
    }
    if let Some(difficulty) = difficulty {
        config = config.with_difficulty(difficulty);
    }
    if let Some(records) = records {
        config = config.with_records_dir(records);
    }
    config
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
