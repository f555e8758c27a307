/*!
# Quayside Simulator

The container terminal model on top of `quayside-core`: vessels arrive from a
seeded arrival model, queue for berths, take a quay crane, have their
containers unloaded one crane step at a time and leave. Trucks optionally
carry each container to the yard.

## Key Components:
- **Terminal:** shared model (pools, vessel registry, counters).
- **Processes:** arrival generator, vessel lifecycle, crane step, truck trip.
- **Arrival Models:** exponential (seeded ChaCha8), fixed and scripted intervals.
- **Trace Digest:** BLAKE3 over the event log, for determinism checks.
- **Scenarios:** YAML files pairing a configuration with its expected digest.
*/

use tracing::{error, info, instrument};

use quayside_config::QuaysideConfig;
use quayside_core::prelude::*;

pub mod arrivals;
pub mod digest;
pub mod error;
pub mod processes;
pub mod report;
pub mod scenario;
pub mod terminal;

pub use arrivals::{ArrivalModel, ExponentialArrivals, FixedArrivals, ScriptedArrivals};
pub use digest::TraceDigest;
pub use error::{ScenarioError, SimulatorError};
pub use report::{SimulationReport, VesselSummary};
pub use scenario::Scenario;
pub use terminal::{Terminal, TerminalStats, VesselPhase};

use processes::ArrivalGenerator;
use terminal::TerminalResources;

/// One configured terminal run.
pub struct TerminalSimulation {
    config: QuaysideConfig,
    arrivals: Box<dyn ArrivalModel>,
}

impl TerminalSimulation {
    /// Exponential arrivals with the configured mean, seeded from the config.
    pub fn new(config: QuaysideConfig) -> Result<Self, SimulatorError> {
        let arrivals =
            ExponentialArrivals::new(config.arrivals.mean_interval, config.simulation.seed)?;
        Ok(Self::with_arrivals(config, arrivals))
    }

    pub fn with_arrivals(config: QuaysideConfig, arrivals: impl ArrivalModel + 'static) -> Self {
        Self {
            config,
            arrivals: Box::new(arrivals),
        }
    }

    pub fn config(&self) -> &QuaysideConfig {
        &self.config
    }

    /// Runs to the configured horizon, feeding every log record to `sink`.
    #[instrument(skip_all, fields(seed = self.config.simulation.seed))]
    pub fn run<S: LogSink>(self, sink: S) -> Result<SimulationReport, SimulatorError> {
        let Self { config, arrivals } = self;

        let mut builder = SimulationBuilder::new((TraceDigest::new(), sink));
        let resources = TerminalResources::register(&config, &mut builder);
        let mut sim = builder.build(Terminal::new(&config, resources));
        sim.spawn(
            "arrivals",
            ArrivalGenerator::new(arrivals, config.arrivals.vessels),
        );

        let horizon = SimTime::new(config.simulation.horizon);
        let summary = sim.run_until(horizon).inspect_err(|e| {
            error!(error = %e, "Terminal run aborted");
        })?;

        let stats_of = |id: Option<ResourceId>| {
            id.and_then(|id| sim.resource(id)).map(Resource::stats)
        };
        let berths = stats_of(Some(resources.berths)).unwrap_or_default();
        let crane_slots = stats_of(resources.crane_slots);
        let truck_slots = stats_of(resources.truck_slots);

        let (terminal, (digest, _)) = sim.into_parts();
        let report = SimulationReport {
            seed: config.simulation.seed,
            horizon: config.simulation.horizon,
            final_time: summary.final_time.as_f64(),
            stop_reason: summary.stop_reason,
            events_processed: summary.events_processed,
            pending_events: summary.pending_events,
            unfinished_processes: summary.unfinished_processes,
            stats: terminal.stats,
            berths,
            crane_slots,
            truck_slots,
            vessels: terminal.vessels.iter().map(VesselSummary::from).collect(),
            log_records: digest.records(),
            trace_digest: digest.hex(),
        };

        info!(
            final_time = report.final_time,
            events = report.events_processed,
            arrived = report.stats.arrived,
            departed = report.stats.departed,
            skipped = report.stats.skipped_arrivals,
            digest = %report.trace_digest,
            "Terminal run finished"
        );
        Ok(report)
    }

    /// Runs into an in-memory log and returns both.
    pub fn run_collected(self) -> Result<(SimulationReport, TraceLog), SimulatorError> {
        let mut log = TraceLog::new();
        let report = self.run(&mut log)?;
        Ok((report, log))
    }
}
