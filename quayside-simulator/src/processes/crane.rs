use quayside_core::prelude::*;

use crate::processes::TruckTrip;
use crate::terminal::{QuayCrane, Terminal, VesselId};

/// Unloads exactly one container from a berthed vessel.
pub struct CraneService {
    vessel: VesselId,
    crane: QuayCrane,
}

impl CraneService {
    pub fn new(vessel: VesselId, crane: QuayCrane) -> Self {
        Self { vessel, crane }
    }
}

impl Process<Terminal> for CraneService {
    fn resume(
        &mut self,
        wake: Wake,
        ctx: &mut Context<'_, Terminal>,
    ) -> Result<Yield, SimulationError> {
        let vessel_name = ctx.model().vessel(self.vessel).name.clone();
        match wake {
            Wake::Start => {
                ctx.log(format!(
                    "Quay Crane {} starts loading container from Vessel {}.",
                    self.crane.name, vessel_name
                ));
                Ok(await_timeout(ctx.model().crane_unit_time))
            }
            Wake::Timeout => {
                let terminal = ctx.model_mut();
                let vessel = terminal.vessel_mut(self.vessel);
                let Some(left) = vessel.containers_remaining.checked_sub(1) else {
                    return Err(ctx.invariant(format!(
                        "Vessel {vessel_name} has no container left to unload"
                    )));
                };
                vessel.containers_remaining = left;
                terminal.stats.containers_unloaded += 1;
                let trucks = terminal.truck_transport;

                ctx.log(format!(
                    "Quay Crane {} loads container from Vessel {}.",
                    self.crane.name, vessel_name
                ));
                if trucks {
                    ctx.spawn(format!("{vessel_name}/truck"), TruckTrip::new(self.vessel));
                }
                Ok(Yield::Done)
            }
            other => Err(ctx.invariant(format!("crane service woken by {other:?}"))),
        }
    }
}
