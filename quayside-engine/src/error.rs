use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

use quayside_config::ConfigError;
use quayside_simulator::{ScenarioError, SimulatorError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulatorError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Trace digest mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        expected: String,
        actual: String,
        bug_report: Option<PathBuf>,
    },

    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_yaml::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JoinError> for EngineError {
    fn from(err: JoinError) -> Self {
        EngineError::Worker(err.to_string())
    }
}
