use quayside_core::prelude::*;

use crate::terminal::{Terminal, Truck, VesselId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    WaitingForTruck,
    Driving,
}

/// Carries one unloaded container to the yard. Detached: nobody joins it,
/// so it may outlive the vessel it came from.
pub struct TruckTrip {
    vessel: VesselId,
    leg: Option<Leg>,
    slot: Option<Grant>,
    truck: Option<Truck>,
}

impl TruckTrip {
    pub fn new(vessel: VesselId) -> Self {
        Self {
            vessel,
            leg: None,
            slot: None,
            truck: None,
        }
    }
}

impl Process<Terminal> for TruckTrip {
    fn resume(
        &mut self,
        wake: Wake,
        ctx: &mut Context<'_, Terminal>,
    ) -> Result<Yield, SimulationError> {
        let vessel_name = ctx.model().vessel(self.vessel).name.clone();
        match (self.leg, wake) {
            (None, Wake::Start) => {
                let Some(slots) = ctx.model().resources.truck_slots else {
                    return Err(ctx.invariant("truck trip started without truck slots"));
                };
                self.leg = Some(Leg::WaitingForTruck);
                Ok(await_resource(slots))
            }
            (Some(Leg::WaitingForTruck), Wake::Granted(grant)) => {
                self.slot = Some(grant);
                let Some(truck) = ctx.model_mut().trucks.pop_front() else {
                    return Err(ctx.invariant("truck slot granted but the truck pool is empty"));
                };
                ctx.log(format!(
                    "Truck {} starts transporting container from Vessel {} to yard.",
                    truck.name, vessel_name
                ));
                self.truck = Some(truck);
                self.leg = Some(Leg::Driving);
                Ok(await_timeout(ctx.model().truck_transport_time))
            }
            (Some(Leg::Driving), Wake::Timeout) => {
                let (Some(truck), Some(slot)) = (self.truck.take(), self.slot.take()) else {
                    return Err(ctx.invariant("truck trip finished without a truck"));
                };
                ctx.log(format!(
                    "Truck {} delivers container from Vessel {} to yard.",
                    truck.name, vessel_name
                ));
                let terminal = ctx.model_mut();
                terminal.stats.deliveries += 1;
                terminal.trucks.push_back(truck);
                ctx.release(slot)?;
                Ok(Yield::Done)
            }
            (leg, other) => Err(ctx.invariant(format!(
                "truck trip in {leg:?} woken by {other:?}"
            ))),
        }
    }
}
