//! ## quayside-simulator::terminal
//! **The shared model every terminal process mutates**
//!
//! `Terminal` owns the resource ids for berths and the optional crane/truck
//! slots, the crane and truck pools, the vessel registry and run counters.
//! Processes reach it through `Context::model_mut` between suspension points.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use quayside_config::{CranePoolPolicy, QuaysideConfig};
use quayside_core::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuayCrane {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Truck {
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VesselId(usize);

impl VesselId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VesselPhase {
    Arrived,
    WaitingForBerth,
    Unloading,
    Departing,
    Gone,
}

impl fmt::Display for VesselPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VesselPhase::Arrived => "arrived",
            VesselPhase::WaitingForBerth => "waiting_for_berth",
            VesselPhase::Unloading => "unloading",
            VesselPhase::Departing => "departing",
            VesselPhase::Gone => "gone",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug)]
pub struct Vessel {
    pub id: VesselId,
    pub name: String,
    pub containers_remaining: u32,
    pub phase: VesselPhase,
    pub arrived_at: SimTime,
    pub berthed_at: Option<SimTime>,
    pub departed_at: Option<SimTime>,
}

impl Vessel {
    pub fn berth_wait(&self) -> Option<SimDuration> {
        self.berthed_at.map(|at| at.duration_since(self.arrived_at))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TerminalStats {
    pub arrived: u32,
    pub berthed: u32,
    pub departed: u32,
    pub skipped_arrivals: u32,
    pub containers_unloaded: u64,
    pub deliveries: u64,
}

/// Resource ids registered for one run.
#[derive(Clone, Copy, Debug)]
pub struct TerminalResources {
    pub berths: ResourceId,
    /// Present under `CranePoolPolicy::Queued`.
    pub crane_slots: Option<ResourceId>,
    /// Present when truck transport is enabled.
    pub truck_slots: Option<ResourceId>,
}

impl TerminalResources {
    /// Registers the resources `config` calls for.
    pub fn register<S: LogSink>(
        config: &QuaysideConfig,
        builder: &mut SimulationBuilder<S>,
    ) -> Self {
        let berths = builder.add_resource("berths", config.terminal.berths);
        let crane_slots = match config.handling.crane_pool {
            CranePoolPolicy::Queued => {
                Some(builder.add_resource("quay cranes", config.terminal.quay_cranes))
            }
            CranePoolPolicy::Immediate => None,
        };
        let truck_slots = config
            .handling
            .truck_transport
            .then(|| builder.add_resource("trucks", config.terminal.trucks));
        Self {
            berths,
            crane_slots,
            truck_slots,
        }
    }
}

pub struct Terminal {
    pub resources: TerminalResources,
    pub berth_capacity: usize,
    pub crane_pool: CranePoolPolicy,
    pub crane_unit_time: SimDuration,
    pub truck_transport_time: SimDuration,
    pub truck_transport: bool,
    pub containers_per_vessel: u32,
    pub cranes: VecDeque<QuayCrane>,
    pub trucks: VecDeque<Truck>,
    pub vessels: Vec<Vessel>,
    pub stats: TerminalStats,
}

impl Terminal {
    pub fn new(config: &QuaysideConfig, resources: TerminalResources) -> Self {
        let cranes = (1..=config.terminal.quay_cranes)
            .map(|i| QuayCrane {
                name: format!("QC{i}"),
            })
            .collect();
        let trucks = (1..=config.terminal.trucks)
            .map(|i| Truck {
                name: format!("T{i}"),
            })
            .collect();
        Self {
            resources,
            berth_capacity: config.terminal.berths,
            crane_pool: config.handling.crane_pool,
            crane_unit_time: SimDuration::new(config.handling.crane_unit_time),
            truck_transport_time: SimDuration::new(config.handling.truck_transport_time),
            truck_transport: config.handling.truck_transport,
            containers_per_vessel: config.arrivals.containers_per_vessel,
            cranes,
            trucks,
            vessels: Vec::new(),
            stats: TerminalStats::default(),
        }
    }

    /// Adds a freshly arrived vessel to the registry.
    pub fn register_vessel(&mut self, name: String, now: SimTime) -> VesselId {
        let id = VesselId(self.vessels.len());
        self.vessels.push(Vessel {
            id,
            name,
            containers_remaining: self.containers_per_vessel,
            phase: VesselPhase::Arrived,
            arrived_at: now,
            berthed_at: None,
            departed_at: None,
        });
        id
    }

    pub fn vessel(&self, id: VesselId) -> &Vessel {
        &self.vessels[id.0]
    }

    pub fn vessel_mut(&mut self, id: VesselId) -> &mut Vessel {
        &mut self.vessels[id.0]
    }
}
