//! ## quayside-simulator::processes
//! **Terminal activities as explicit state machines**
//!
//! - `generator`: spawns vessels at intervals from an `ArrivalModel`
//! - `vessel`: berth, crane, unload, depart
//! - `crane`: one container per crane service step
//! - `truck`: optional yard transport after each crane step

mod crane;
mod generator;
mod truck;
mod vessel;

pub use crane::CraneService;
pub use generator::ArrivalGenerator;
pub use truck::TruckTrip;
pub use vessel::VesselProcess;
