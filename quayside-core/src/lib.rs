//! # quayside-core
//!
//! Discrete-event simulation substrate for the Quayside terminal model.
//! Single-threaded and cooperative: exactly one process body segment runs at a
//! time, and simulated time only moves when the scheduler pops an event.
//!
//! ### Key Submodules:
//! - `time/`: `SimTime`, `SimDuration` and the `VirtualClock`
//! - `events/`: `(time, sequence)`-ordered event queue
//! - `resource/`: capacity-limited FIFO resources and grants
//! - `process/`: the suspension protocol processes are written against
//! - `sim`: the scheduler (`Simulation`) and the `Context` handed to processes
//! - `trace/`: append-only log sinks for `<time>: <message>` records

pub mod error;
pub mod events;
pub mod process;
pub mod resource;
pub mod sim;
pub mod time;
pub mod trace;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::events::{Event, EventQueue};
    pub use crate::process::*;
    pub use crate::resource::*;
    pub use crate::sim::*;
    pub use crate::time::*;
    pub use crate::trace::*;
}

pub use error::SimulationError;
pub use sim::{Context, RunSummary, Simulation, SimulationBuilder, StopReason};
