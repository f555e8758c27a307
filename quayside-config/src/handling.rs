//! Container handling: crane and truck service times and policies.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// How a berthed vessel obtains a quay crane.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CranePoolPolicy {
    /// Wait in FIFO order for a free crane, like berths.
    #[default]
    Queued,
    /// Take a crane immediately; an empty pool aborts the run.
    Immediate,
}

impl fmt::Display for CranePoolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CranePoolPolicy::Queued => f.write_str("queued"),
            CranePoolPolicy::Immediate => f.write_str("immediate"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct HandlingConfig {
    /// Time for one crane to unload one container.
    #[serde(default = "default_crane_unit_time")]
    #[validate(custom(function = validation::validate_duration))]
    pub crane_unit_time: f64,

    /// Time for one truck trip to the yard.
    #[serde(default = "default_truck_transport_time")]
    #[validate(custom(function = validation::validate_duration))]
    pub truck_transport_time: f64,

    #[serde(default)]
    pub crane_pool: CranePoolPolicy,

    /// Send every unloaded container to the yard by truck.
    #[serde(default)]
    pub truck_transport: bool,
}

impl Default for HandlingConfig {
    fn default() -> Self {
        Self {
            crane_unit_time: default_crane_unit_time(),
            truck_transport_time: default_truck_transport_time(),
            crane_pool: CranePoolPolicy::default(),
            truck_transport: false,
        }
    }
}

fn default_crane_unit_time() -> f64 {
    3.0
}

fn default_truck_transport_time() -> f64 {
    6.0
}
