//! Run-level parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Simulated time at which the run stops.
    #[serde(default = "default_horizon")]
    #[validate(custom(function = validation::validate_duration))]
    pub horizon: f64,

    /// Seed for the arrival model's random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            seed: default_seed(),
        }
    }
}

fn default_horizon() -> f64 {
    720.0
}

fn default_seed() -> u64 {
    42
}
