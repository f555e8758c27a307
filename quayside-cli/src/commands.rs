use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, ensure, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use quayside_config::QuaysideConfig;
use quayside_engine::{DiagnosticsCollector, RunOptions, SimulationRuntime};
use quayside_telemetry::MetricsRecorder;

#[derive(Parser)]
#[command(name = "quayside", version, about = "Discrete-event container terminal simulator")]
pub struct Cli {
    /// Configuration file; defaults to config/quayside.yaml plus the
    /// QUAYSIDE_ENV overlay.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for bug reports.
    #[arg(long, global = true, default_value = ".")]
    pub diagnostics_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one simulation and print its event log
    Run(RunArgs),
    /// Run many seeds in parallel and print one summary line per seed
    Sweep(SweepArgs),
    /// Replay a recorded scenario and check its digest
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub horizon: Option<f64>,
    /// Do not print the event log
    #[arg(short, long)]
    pub quiet: bool,
    /// Write a YAML run report here
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Record the configuration and digest as a replayable scenario
    #[arg(long)]
    pub save_scenario: Option<PathBuf>,
    /// Fail unless the event log digest matches
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[arg(long, default_value_t = 1)]
    pub start_seed: u64,
    #[arg(long, default_value_t = 16)]
    pub runs: u32,
    /// Concurrent runs (default: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(short, long)]
    pub scenario: PathBuf,
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn load_config(path: Option<&PathBuf>) -> Result<QuaysideConfig> {
    let config = match path {
        Some(path) => QuaysideConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => QuaysideConfig::load().context("loading configuration")?,
    };
    Ok(config)
}

pub async fn run_command(cli: Cli, config: QuaysideConfig) -> Result<()> {
    let metrics = MetricsRecorder::new().context("registering metrics")?;
    let runtime = Arc::new(SimulationRuntime::new(
        metrics,
        DiagnosticsCollector::new(&cli.diagnostics_dir),
    ));

    match cli.command {
        Commands::Run(args) => run(&runtime, config, args),
        Commands::Sweep(args) => sweep(runtime, config, args).await,
        Commands::Replay(args) => {
            let report = runtime.replay_scenario(&args.scenario, args.quiet)?;
            info!(digest = %report.trace_digest, "Replay matched");
            Ok(())
        }
    }
}

fn run(runtime: &SimulationRuntime, mut config: QuaysideConfig, args: RunArgs) -> Result<()> {
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(horizon) = args.horizon {
        ensure!(
            horizon.is_finite() && horizon >= 0.0,
            "--horizon must be a finite, non-negative time"
        );
        config.simulation.horizon = horizon;
    }

    let options = RunOptions {
        quiet: args.quiet,
        report_path: args.report,
        save_scenario: args.save_scenario,
        validate_hash: args.validate_hash,
    };
    let report = runtime.run_simulation(config, &options)?;
    eprintln!("trace digest: {}", report.trace_digest);
    Ok(())
}

async fn sweep(
    runtime: Arc<SimulationRuntime>,
    config: QuaysideConfig,
    args: SweepArgs,
) -> Result<()> {
    let results = runtime
        .clone()
        .run_sweep(config, args.start_seed, args.runs, args.jobs)
        .await?;

    let mut failed = 0;
    for run in &results {
        match &run.result {
            Ok(report) => println!(
                "seed {}: {} events, {} arrived, {} departed, {} skipped, digest {}",
                run.seed,
                report.events_processed,
                report.stats.arrived,
                report.stats.departed,
                report.stats.skipped_arrivals,
                report.trace_digest,
            ),
            Err(e) => {
                failed += 1;
                println!("seed {}: failed: {e}", run.seed);
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} sweep runs failed", results.len());
    }
    Ok(())
}
