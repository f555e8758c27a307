/*!
# Runtime Engine

Run orchestration shared by every frontend: single runs with optional report,
scenario recording and digest validation; parameter sweeps over consecutive
seeds on a bounded pool of blocking workers; scenario replay with bug reports
on divergence.
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use opentelemetry::KeyValue;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, instrument, warn};

use quayside_config::QuaysideConfig;
use quayside_core::trace::{LogSink, NullSink, WriterSink};
use quayside_simulator::{Scenario, SimulationReport, TerminalSimulation};
use quayside_telemetry::{EventLogger, MetricsRecorder};

use crate::diagnostics::{BugReport, DiagnosticsCollector};
use crate::error::EngineError;

/// Extras for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Suppress the event log on stdout.
    pub quiet: bool,
    pub report_path: Option<PathBuf>,
    pub save_scenario: Option<PathBuf>,
    pub validate_hash: Option<String>,
}

/// One seed of a sweep.
#[derive(Debug)]
pub struct SweepRun {
    pub seed: u64,
    pub result: Result<SimulationReport, EngineError>,
}

pub struct SimulationRuntime {
    metrics: MetricsRecorder,
    diagnostics: Mutex<DiagnosticsCollector>,
}

impl SimulationRuntime {
    pub fn new(metrics: MetricsRecorder, diagnostics: DiagnosticsCollector) -> Self {
        Self {
            metrics,
            diagnostics: Mutex::new(diagnostics),
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn bug_reports(&self) -> Vec<PathBuf> {
        self.diagnostics.lock().bug_reports().to_vec()
    }

    /// Runs one configuration to its horizon.
    #[instrument(
        level = "info",
        name = "run_simulation",
        skip_all,
        fields(seed = config.simulation.seed)
    )]
    pub fn run_simulation(
        &self,
        config: QuaysideConfig,
        options: &RunOptions,
    ) -> Result<SimulationReport, EngineError> {
        let echo = config.telemetry.echo_events && !options.quiet;
        let report = self.execute(&config, echo)?;

        if let Some(expected) = &options.validate_hash {
            self.check_digest(&config, expected, &report.trace_digest)?;
        }
        if let Some(path) = &options.save_scenario {
            save_scenario(&config, &report, path)?;
        }
        if let Some(path) = &options.report_path {
            write_report(&report, path)?;
        }

        EventLogger::log_event(
            "simulation_complete",
            vec![
                KeyValue::new("seed", report.seed.to_string()),
                KeyValue::new("events", report.events_processed.to_string()),
                KeyValue::new("final_time", report.final_time.to_string()),
                KeyValue::new("trace_digest", report.trace_digest.clone()),
            ],
        );
        Ok(report)
    }

    /// Re-runs a recorded scenario and checks its digest.
    #[instrument(level = "info", name = "replay_scenario", skip(self))]
    pub fn replay_scenario(
        &self,
        path: &Path,
        quiet: bool,
    ) -> Result<SimulationReport, EngineError> {
        let scenario = Scenario::load(path)?;
        let echo = scenario.config.telemetry.echo_events && !quiet;
        let report = self.execute(&scenario.config, echo)?;

        match &scenario.expected_digest {
            Some(expected) => {
                self.check_digest(&scenario.config, expected, &report.trace_digest)?;
                self.diagnostics
                    .lock()
                    .record_scenario_hash(path, &report.trace_digest);
                info!("Scenario validation successful");
            }
            None => warn!("Scenario has no recorded digest; nothing to validate"),
        }

        EventLogger::log_event(
            "replay_complete",
            vec![
                KeyValue::new("scenario", path.display().to_string()),
                KeyValue::new("trace_digest", report.trace_digest.clone()),
            ],
        );
        Ok(report)
    }

    /// Independent runs over `runs` consecutive seeds, at most `jobs` at a
    /// time (default: one per CPU). Results come back in seed order; a failed
    /// run does not stop the others.
    #[instrument(level = "info", name = "run_sweep", skip(self, config))]
    pub async fn run_sweep(
        self: Arc<Self>,
        config: QuaysideConfig,
        start_seed: u64,
        runs: u32,
        jobs: Option<usize>,
    ) -> Result<Vec<SweepRun>, EngineError> {
        let jobs = jobs.unwrap_or_else(num_cpus::get).max(1);
        let permits = Arc::new(Semaphore::new(jobs));
        info!(jobs, runs, start_seed, "Starting sweep");

        let mut handles = Vec::with_capacity(runs as usize);
        for offset in 0..runs {
            let seed = start_seed.wrapping_add(u64::from(offset));
            let mut config = config.clone();
            config.simulation.seed = seed;

            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| EngineError::Worker(e.to_string()))?;
            let runtime = Arc::clone(&self);
            debug!(seed, "Dispatching sweep run");
            handles.push((
                seed,
                spawn_blocking(move || {
                    let _permit = permit;
                    runtime.execute(&config, false)
                }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (seed, handle) in handles {
            let result = handle.await?;
            if let Err(e) = &result {
                warn!(seed, "Sweep run failed: {e}");
            }
            results.push(SweepRun { seed, result });
        }

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        info!(runs = results.len(), failed, "Sweep finished");
        EventLogger::log_event(
            "sweep_complete",
            vec![
                KeyValue::new("runs", results.len().to_string()),
                KeyValue::new("failed", failed.to_string()),
            ],
        );
        Ok(results)
    }

    fn execute(
        &self,
        config: &QuaysideConfig,
        echo: bool,
    ) -> Result<SimulationReport, EngineError> {
        let simulation = TerminalSimulation::new(config.clone())?;
        let sink: Box<dyn LogSink> = if echo {
            Box::new(WriterSink::new(std::io::stdout()))
        } else {
            Box::new(NullSink)
        };

        match simulation.run(sink) {
            Ok(report) => {
                self.record_metrics(&report);
                Ok(report)
            }
            Err(e) => {
                error!(seed = config.simulation.seed, "Run aborted: {e}");
                let bug = BugReport {
                    kind: "run_aborted".into(),
                    seed: config.simulation.seed,
                    detail: e.to_string(),
                    expected_digest: None,
                    actual_digest: None,
                    config: config.clone(),
                };
                if let Some(path) = self.diagnostics.lock().try_record_bug_report(&bug) {
                    error!("Bug report saved to: {}", path.display());
                }
                Err(e.into())
            }
        }
    }

    fn check_digest(
        &self,
        config: &QuaysideConfig,
        expected: &str,
        actual: &str,
    ) -> Result<(), EngineError> {
        if expected == actual {
            return Ok(());
        }
        error!("Hash mismatch! Expected: {expected}");
        let bug = BugReport {
            kind: "digest_mismatch".into(),
            seed: config.simulation.seed,
            detail: "event log diverged from the recorded digest".into(),
            expected_digest: Some(expected.to_string()),
            actual_digest: Some(actual.to_string()),
            config: config.clone(),
        };
        let bug_report = self.diagnostics.lock().try_record_bug_report(&bug);
        if let Some(path) = &bug_report {
            error!("Bug report saved to: {}", path.display());
        }
        EventLogger::log_event(
            "digest_mismatch",
            vec![
                KeyValue::new("expected", expected.to_string()),
                KeyValue::new("actual", actual.to_string()),
            ],
        );
        Err(EngineError::HashMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
            bug_report,
        })
    }

    fn record_metrics(&self, report: &SimulationReport) {
        let m = &self.metrics;
        m.processed_events.inc_by(report.events_processed);
        m.vessel_arrivals.inc_by(u64::from(report.stats.arrived));
        m.vessel_departures.inc_by(u64::from(report.stats.departed));
        m.skipped_arrivals.inc_by(u64::from(report.stats.skipped_arrivals));
        m.containers_unloaded.inc_by(report.stats.containers_unloaded);
        m.truck_deliveries.inc_by(report.stats.deliveries);
        m.completed_runs.inc();
        for wait in report.vessels.iter().filter_map(|v| v.berth_wait) {
            m.observe_berth_wait(wait);
        }
    }
}

/// Records `config` with the digest `report` produced.
pub fn save_scenario(
    config: &QuaysideConfig,
    report: &SimulationReport,
    path: &Path,
) -> Result<(), EngineError> {
    Scenario::new(config.clone(), Some(report.trace_digest.clone())).save(path)?;
    info!("Scenario saved to {}", path.display());
    Ok(())
}

pub fn write_report(report: &SimulationReport, path: &Path) -> Result<(), EngineError> {
    fs::write(path, report.to_yaml()?)?;
    info!("Report written to {}", path.display());
    Ok(())
}
