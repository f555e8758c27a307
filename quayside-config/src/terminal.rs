//! Terminal layout: how many of each service unit exist.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Zero cranes or trucks is accepted; vessels then wait forever.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TerminalConfig {
    #[serde(default = "default_berths")]
    #[validate(range(min = 1, message = "a terminal needs at least one berth"))]
    pub berths: usize,

    #[serde(default = "default_quay_cranes")]
    pub quay_cranes: usize,

    #[serde(default = "default_trucks")]
    pub trucks: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            berths: default_berths(),
            quay_cranes: default_quay_cranes(),
            trucks: default_trucks(),
        }
    }
}

fn default_berths() -> usize {
    2
}

fn default_quay_cranes() -> usize {
    2
}

fn default_trucks() -> usize {
    3
}
