//! Vessel arrival stream.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ArrivalConfig {
    /// Arrival attempts made by the generator.
    #[serde(default = "default_vessels")]
    pub vessels: u32,

    /// Mean of the exponential inter-arrival distribution.
    #[serde(default = "default_mean_interval")]
    #[validate(custom(function = validation::validate_positive))]
    pub mean_interval: f64,

    #[serde(default = "default_containers_per_vessel")]
    pub containers_per_vessel: u32,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            vessels: default_vessels(),
            mean_interval: default_mean_interval(),
            containers_per_vessel: default_containers_per_vessel(),
        }
    }
}

fn default_vessels() -> u32 {
    4
}

fn default_mean_interval() -> f64 {
    300.0
}

fn default_containers_per_vessel() -> u32 {
    150
}
