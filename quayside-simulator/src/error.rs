use std::path::PathBuf;

use thiserror::Error;

use quayside_config::ConfigError;
use quayside_core::SimulationError;

use crate::arrivals::ArrivalError;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("arrival model: {0}")]
    Arrivals(#[from] ArrivalError),
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("scenario configuration rejected: {0}")]
    Config(#[from] ConfigError),
}
