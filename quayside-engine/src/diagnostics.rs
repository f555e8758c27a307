use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Serialize;
use tracing::warn;

use quayside_config::QuaysideConfig;

/// What went wrong, with enough context to rerun it.
#[derive(Debug, Clone, Serialize)]
pub struct BugReport {
    pub kind: String,
    pub seed: u64,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_digest: Option<String>,
    pub config: QuaysideConfig,
}

/// Writes bug reports into `output_dir` and remembers verified scenario
/// digests for the lifetime of the engine.
#[derive(Debug)]
pub struct DiagnosticsCollector {
    output_dir: PathBuf,
    bug_reports: Vec<PathBuf>,
    scenario_hashes: HashMap<String, String>,
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DiagnosticsCollector {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            bug_reports: Vec::new(),
            scenario_hashes: HashMap::new(),
        }
    }

    /// Writes `report` as `bug_report_<unix secs>_<n>.yaml`.
    pub fn record_bug_report(&mut self, report: &BugReport) -> std::io::Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let filename = format!("bug_report_{timestamp}_{}.yaml", self.bug_reports.len());
        let path = self.output_dir.join(filename);

        let text = serde_yaml::to_string(report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::create_dir_all(&self.output_dir)?;
        fs::write(&path, text)?;

        self.bug_reports.push(path.clone());
        Ok(path)
    }

    /// Like `record_bug_report`, but a write failure only logs.
    pub fn try_record_bug_report(&mut self, report: &BugReport) -> Option<PathBuf> {
        match self.record_bug_report(report) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write bug report: {e}");
                None
            }
        }
    }

    pub fn record_scenario_hash(&mut self, scenario_path: &Path, hash: &str) {
        self.scenario_hashes.insert(
            scenario_path.to_string_lossy().into_owned(),
            hash.to_string(),
        );
    }

    pub fn scenario_hash(&self, scenario_path: &Path) -> Option<&str> {
        self.scenario_hashes
            .get(scenario_path.to_string_lossy().as_ref())
            .map(String::as_str)
    }

    pub fn bug_reports(&self) -> &[PathBuf] {
        &self.bug_reports
    }
}
