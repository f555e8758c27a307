use quayside_config::CranePoolPolicy;
use quayside_core::prelude::*;
use tracing::debug;

use crate::processes::CraneService;
use crate::terminal::{QuayCrane, Terminal, VesselId, VesselPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Arriving,
    WaitingForBerth,
    WaitingForCrane,
    Unloading,
}

/// One vessel from arrival to departure.
///
/// Holds its berth grant, its crane and (under the queued crane policy) a
/// crane slot grant for as long as it is alongside.
pub struct VesselProcess {
    vessel: VesselId,
    stage: Stage,
    berth: Option<Grant>,
    crane_slot: Option<Grant>,
    crane: Option<QuayCrane>,
}

impl VesselProcess {
    pub fn new(vessel: VesselId) -> Self {
        Self {
            vessel,
            stage: Stage::Arriving,
            berth: None,
            crane_slot: None,
            crane: None,
        }
    }

    fn name(&self, ctx: &Context<'_, Terminal>) -> String {
        ctx.model().vessel(self.vessel).name.clone()
    }

    fn set_phase(&self, ctx: &mut Context<'_, Terminal>, phase: VesselPhase) {
        ctx.model_mut().vessel_mut(self.vessel).phase = phase;
    }

    fn arrive(&mut self, ctx: &mut Context<'_, Terminal>) -> Yield {
        let name = self.name(ctx);
        ctx.log(format!("Vessel {name} arrives at the terminal."));
        self.set_phase(ctx, VesselPhase::WaitingForBerth);
        self.stage = Stage::WaitingForBerth;
        await_resource(ctx.model().resources.berths)
    }

    fn berth(
        &mut self,
        grant: Grant,
        ctx: &mut Context<'_, Terminal>,
    ) -> Result<Yield, SimulationError> {
        self.berth = Some(grant);
        let name = self.name(ctx);
        ctx.log(format!("Vessel {name} berths."));
        let now = ctx.now();
        let terminal = ctx.model_mut();
        terminal.stats.berthed += 1;
        let vessel = terminal.vessel_mut(self.vessel);
        vessel.berthed_at = Some(now);
        vessel.phase = VesselPhase::Unloading;

        match (terminal.crane_pool, terminal.resources.crane_slots) {
            (CranePoolPolicy::Queued, Some(slots)) => {
                self.stage = Stage::WaitingForCrane;
                Ok(await_resource(slots))
            }
            (CranePoolPolicy::Queued, None) => {
                Err(ctx.invariant("queued crane policy without crane slots"))
            }
            (CranePoolPolicy::Immediate, _) => {
                let Some(crane) = terminal.cranes.pop_front() else {
                    return Err(ctx.exhausted("quay cranes"));
                };
                self.assign(crane, ctx);
                self.unload_next(ctx)
            }
        }
    }

    fn take_crane_slot(
        &mut self,
        grant: Grant,
        ctx: &mut Context<'_, Terminal>,
    ) -> Result<Yield, SimulationError> {
        self.crane_slot = Some(grant);
        let Some(crane) = ctx.model_mut().cranes.pop_front() else {
            return Err(ctx.invariant("crane slot granted but the crane pool is empty"));
        };
        self.assign(crane, ctx);
        self.unload_next(ctx)
    }

    fn assign(&mut self, crane: QuayCrane, ctx: &Context<'_, Terminal>) {
        debug!(vessel = %self.name(ctx), crane = %crane.name, "Crane assigned");
        self.crane = Some(crane);
        self.stage = Stage::Unloading;
    }

    /// Spawns the next crane step, or departs once the hold is empty.
    fn unload_next(&mut self, ctx: &mut Context<'_, Terminal>) -> Result<Yield, SimulationError> {
        let remaining = ctx.model().vessel(self.vessel).containers_remaining;
        if remaining == 0 {
            return self.depart(ctx);
        }
        let Some(crane) = self.crane.clone() else {
            return Err(ctx.invariant("unloading without a crane"));
        };
        let name = format!("{}/{}", self.name(ctx), crane.name);
        let step = ctx.spawn(name, CraneService::new(self.vessel, crane));
        Ok(await_process(step))
    }

    fn depart(&mut self, ctx: &mut Context<'_, Terminal>) -> Result<Yield, SimulationError> {
        self.set_phase(ctx, VesselPhase::Departing);
        let Some(crane) = self.crane.take() else {
            return Err(ctx.invariant("departing without a crane"));
        };
        ctx.model_mut().cranes.push_back(crane);
        if let Some(slot) = self.crane_slot.take() {
            ctx.release(slot)?;
        }
        let Some(berth) = self.berth.take() else {
            return Err(ctx.invariant("departing without a berth"));
        };
        ctx.release(berth)?;

        let name = self.name(ctx);
        ctx.log(format!("Vessel {name} leaves the terminal."));
        let now = ctx.now();
        let terminal = ctx.model_mut();
        terminal.stats.departed += 1;
        let vessel = terminal.vessel_mut(self.vessel);
        vessel.departed_at = Some(now);
        vessel.phase = VesselPhase::Gone;
        Ok(Yield::Done)
    }
}

impl Process<Terminal> for VesselProcess {
    fn resume(
        &mut self,
        wake: Wake,
        ctx: &mut Context<'_, Terminal>,
    ) -> Result<Yield, SimulationError> {
        match (self.stage, wake) {
            (Stage::Arriving, Wake::Start) => Ok(self.arrive(ctx)),
            (Stage::WaitingForBerth, Wake::Granted(grant)) => self.berth(grant, ctx),
            (Stage::WaitingForCrane, Wake::Granted(grant)) => self.take_crane_slot(grant, ctx),
            (Stage::Unloading, Wake::Joined(_)) => self.unload_next(ctx),
            (stage, other) => Err(ctx.invariant(format!("vessel in {stage:?} woken by {other:?}"))),
        }
    }
}
