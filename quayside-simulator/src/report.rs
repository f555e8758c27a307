//! Serializable outcome of one terminal run.

use serde::Serialize;

use quayside_core::resource::ResourceStats;
use quayside_core::sim::StopReason;

use crate::terminal::{TerminalStats, Vessel, VesselPhase};

#[derive(Debug, Clone, Serialize)]
pub struct VesselSummary {
    pub name: String,
    pub phase: VesselPhase,
    pub containers_remaining: u32,
    pub arrived_at: f64,
    pub berthed_at: Option<f64>,
    pub departed_at: Option<f64>,
    pub berth_wait: Option<f64>,
}

impl From<&Vessel> for VesselSummary {
    fn from(vessel: &Vessel) -> Self {
        Self {
            name: vessel.name.clone(),
            phase: vessel.phase,
            containers_remaining: vessel.containers_remaining,
            arrived_at: vessel.arrived_at.as_f64(),
            berthed_at: vessel.berthed_at.map(|t| t.as_f64()),
            departed_at: vessel.departed_at.map(|t| t.as_f64()),
            berth_wait: vessel.berth_wait().map(|d| d.as_f64()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub horizon: f64,
    pub final_time: f64,
    pub stop_reason: StopReason,
    pub events_processed: u64,
    pub pending_events: usize,
    pub unfinished_processes: usize,
    pub stats: TerminalStats,
    pub berths: ResourceStats,
    pub crane_slots: Option<ResourceStats>,
    pub truck_slots: Option<ResourceStats>,
    pub vessels: Vec<VesselSummary>,
    pub log_records: usize,
    pub trace_digest: String,
}

impl SimulationReport {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
