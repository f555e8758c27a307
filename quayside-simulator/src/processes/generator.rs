use quayside_core::prelude::*;
use tracing::info;

use crate::arrivals::ArrivalModel;
use crate::processes::VesselProcess;
use crate::terminal::Terminal;

/// Makes `count` arrival attempts, one interval apart.
///
/// Before each spawn it looks at the berth wait queue and skips the vessel
/// if the queue already holds `berth_capacity` or more. The check and the
/// spawn are not atomic with respect to berth requests; vessels spawned at
/// the same instant all pass it.
pub struct ArrivalGenerator<A> {
    arrivals: A,
    count: u32,
    issued: u32,
}

impl<A: ArrivalModel> ArrivalGenerator<A> {
    pub fn new(arrivals: A, count: u32) -> Self {
        Self {
            arrivals,
            count,
            issued: 0,
        }
    }

    fn admit(&self, ctx: &mut Context<'_, Terminal>) -> Result<(), SimulationError> {
        let name = format!("V{}", self.issued);
        let berths = ctx.model().resources.berths;
        let capacity = ctx.model().berth_capacity;
        let Some(queued) = ctx.resource(berths).map(Resource::queue_len) else {
            return Err(ctx.invariant("berth resource missing"));
        };

        if queued < capacity {
            let now = ctx.now();
            let terminal = ctx.model_mut();
            let vessel = terminal.register_vessel(name.clone(), now);
            terminal.stats.arrived += 1;
            ctx.spawn(name, VesselProcess::new(vessel));
        } else {
            ctx.model_mut().stats.skipped_arrivals += 1;
            info!(
                vessel = %name,
                queued,
                capacity,
                time = %ctx.now(),
                "Arrival skipped, berth queue full"
            );
        }
        Ok(())
    }
}

impl<A: ArrivalModel + 'static> Process<Terminal> for ArrivalGenerator<A> {
    fn resume(
        &mut self,
        wake: Wake,
        ctx: &mut Context<'_, Terminal>,
    ) -> Result<Yield, SimulationError> {
        match wake {
            Wake::Start => {}
            Wake::Timeout => self.admit(ctx)?,
            other => return Err(ctx.invariant(format!("arrival generator woken by {other:?}"))),
        }
        if self.issued == self.count {
            return Ok(Yield::Done);
        }
        self.issued += 1;
        Ok(await_timeout(self.arrivals.next_interval()))
    }
}
