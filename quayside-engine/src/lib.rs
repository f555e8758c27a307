//! # quayside-engine
//!
//! Runs terminal simulations on behalf of a frontend: single runs, seed
//! sweeps, scenario recording and replay. Every run feeds the prometheus
//! metrics; aborted runs and digest mismatches leave a YAML bug report.

pub mod diagnostics;
pub mod error;
pub mod runtime;

// Frontends only need these.
pub use diagnostics::{BugReport, DiagnosticsCollector};
pub use error::EngineError;
pub use runtime::{save_scenario, write_report, RunOptions, SimulationRuntime, SweepRun};
