//! ## quayside-core::sim
//! **Scheduler and process context**
//!
//! `Simulation` owns the clock, the event queue, every resource, every
//! process and the shared model. Each step pops the earliest event, advances
//! the clock and resumes the target process with a `Context` borrowing the
//! rest of the world. Whatever the process yields is turned into a queued
//! wake-up or a wait registration before the next step.

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::error::{ProcessMisuseKind, SimulationError};
use crate::events::{Event, EventQueue};
use crate::process::{
    Process, ProcessId, ProcessRef, ProcessState, ProcessTable, WaitCondition, Wake, Yield,
};
use crate::resource::{Grant, MisuseKind, Request, Resource, ResourceId};
use crate::time::{SimTime, VirtualClock};
use crate::trace::{LogRecord, LogSink, TraceLog};

/// Clock, queue and resources. Split from the process table so a running
/// process can borrow both at once.
#[derive(Debug, Default)]
struct Kernel {
    clock: VirtualClock,
    queue: EventQueue,
    resources: Vec<Resource>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    QueueExhausted,
    HorizonReached,
}

/// Outcome of `run` / `run_until`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub events_processed: u64,
    pub final_time: SimTime,
    pub stop_reason: StopReason,
    /// Events still queued past the horizon.
    pub pending_events: usize,
    /// Processes abandoned in place (not finished).
    pub unfinished_processes: usize,
}

pub struct Simulation<M, S = TraceLog> {
    kernel: Kernel,
    processes: ProcessTable<M>,
    model: M,
    sink: S,
    events_processed: u64,
}

/// Registers resources before the model exists, so the model can be built
/// around their ids.
pub struct SimulationBuilder<S> {
    kernel: Kernel,
    sink: S,
}

impl<S: LogSink> SimulationBuilder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            kernel: Kernel::default(),
            sink,
        }
    }

    pub fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        self.kernel.add_resource(name, capacity)
    }

    pub fn build<M>(self, model: M) -> Simulation<M, S> {
        Simulation {
            kernel: self.kernel,
            processes: ProcessTable::new(),
            model,
            sink: self.sink,
            events_processed: 0,
        }
    }
}

impl Kernel {
    fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        let id = ResourceId::from_raw(self.resources.len());
        let resource = Resource::new(id, name, capacity);
        debug!(resource = %id, name = resource.name(), capacity, "Resource registered");
        self.resources.push(resource);
        id
    }
}

impl<M, S: LogSink> Simulation<M, S> {
    pub fn new(model: M, sink: S) -> Self {
        SimulationBuilder::new(sink).build(model)
    }

    pub fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        self.kernel.add_resource(name, capacity)
    }

    /// Registers a process; it starts at the current time.
    pub fn spawn<P>(&mut self, name: impl Into<String>, process: P) -> ProcessId
    where
        P: Process<M> + 'static,
    {
        let id = self.processes.insert(name.into(), Box::new(process));
        self.kernel.queue.push(self.now(), id, Wake::Start);
        id
    }

    /// Low-level: queue a wake-up for `process` at the absolute time `at`.
    pub fn schedule(
        &mut self,
        at: SimTime,
        process: ProcessId,
        wake: Wake,
    ) -> Result<u64, SimulationError> {
        let now = self.now();
        if !at.is_valid() || at < now {
            return Err(SimulationError::Causality {
                now,
                requested: at,
                process: self.processes.reference(process),
            });
        }
        Ok(self.kernel.queue.push(at, process, wake))
    }

    pub fn now(&self) -> SimTime {
        self.kernel.clock.now()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.kernel.resources.get(id.index())
    }

    pub fn process_state(&self, id: ProcessId) -> Option<ProcessState> {
        self.processes.get(id).map(|slot| slot.state)
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn pending_events(&self) -> usize {
        self.kernel.queue.len()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn into_parts(self) -> (M, S) {
        (self.model, self.sink)
    }

    /// Processes the earliest event. Returns `false` if the queue was empty.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        match self.kernel.queue.pop() {
            Some(event) => {
                self.dispatch(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs until the queue is empty or the next event lies beyond `until`.
    /// Events at exactly `until` are processed; later ones stay queued.
    #[instrument(level = "debug", skip(self), fields(until = %until))]
    pub fn run_until(&mut self, until: SimTime) -> Result<RunSummary, SimulationError> {
        let started_with = self.events_processed;
        let stop_reason = loop {
            match self.kernel.queue.peek_time() {
                None => break StopReason::QueueExhausted,
                Some(next) if next > until => break StopReason::HorizonReached,
                Some(_) => {
                    self.step()?;
                }
            }
        };
        if until.is_valid() && self.now() < until {
            // Cannot fail: `until` is ahead of the clock.
            let _ = self.kernel.clock.advance_to(until);
        }
        Ok(self.summary(stop_reason, started_with))
    }

    /// Runs until no events remain.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        let started_with = self.events_processed;
        while self.step()? {}
        Ok(self.summary(StopReason::QueueExhausted, started_with))
    }

    fn summary(&self, stop_reason: StopReason, started_with: u64) -> RunSummary {
        RunSummary {
            events_processed: self.events_processed - started_with,
            final_time: self.now(),
            stop_reason,
            pending_events: self.kernel.queue.len(),
            unfinished_processes: self.processes.unfinished(),
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<(), SimulationError> {
        let Event {
            time,
            sequence,
            process,
            wake,
        } = event;

        if let Err(rewind) = self.kernel.clock.advance_to(time) {
            return Err(SimulationError::Causality {
                now: rewind.now,
                requested: rewind.requested,
                process: self.processes.reference(process),
            });
        }
        self.events_processed += 1;
        trace!(time = %time, sequence, process = %process, ?wake, "Dispatching event");

        let body = match self.processes.get_mut(process) {
            Some(slot) => {
                slot.state = ProcessState::Runnable;
                slot.body.take()
            }
            None => {
                return Err(self.process_misuse(process, ProcessMisuseKind::UnknownProcess(process)))
            }
        };
        let Some(mut body) = body else {
            return Err(self.process_misuse(process, ProcessMisuseKind::ResumedFinished));
        };

        let outcome = {
            let mut ctx = Context {
                current: process,
                now: time,
                kernel: &mut self.kernel,
                processes: &mut self.processes,
                model: &mut self.model,
                sink: &mut self.sink,
            };
            body.resume(wake, &mut ctx)
        };
        if let Some(slot) = self.processes.get_mut(process) {
            slot.body = Some(body);
        }
        self.suspend(process, outcome?)
    }

    fn suspend(&mut self, process: ProcessId, yielded: Yield) -> Result<(), SimulationError> {
        let now = self.now();
        let state = match yielded {
            Yield::Timeout(duration) => {
                if !duration.is_valid() {
                    return Err(
                        self.process_misuse(process, ProcessMisuseKind::InvalidDuration(duration))
                    );
                }
                let until = now + duration;
                if !until.is_valid() {
                    return Err(SimulationError::Causality {
                        now,
                        requested: until,
                        process: self.processes.reference(process),
                    });
                }
                self.kernel.queue.push(until, process, Wake::Timeout);
                ProcessState::Waiting(WaitCondition::Timeout { until })
            }
            Yield::Resource(id) => {
                let Some(resource) = self.kernel.resources.get_mut(id.index()) else {
                    return Err(SimulationError::ResourceMisuse {
                        now,
                        process: self.processes.reference(process),
                        resource: "<unknown>".into(),
                        kind: MisuseKind::UnknownResource(id),
                    });
                };
                match resource.request(process, now) {
                    Request::Granted(grant) => {
                        debug!(
                            resource = resource.name(),
                            process = %process,
                            grant = grant.id(),
                            "Granted immediately"
                        );
                        self.kernel.queue.push(now, process, Wake::Granted(grant));
                    }
                    Request::Queued { position } => {
                        debug!(
                            resource = resource.name(),
                            process = %process,
                            position,
                            "Queued for resource"
                        );
                    }
                }
                ProcessState::Waiting(WaitCondition::Resource(id))
            }
            Yield::Join(child) => {
                if child == process {
                    return Err(self.process_misuse(process, ProcessMisuseKind::SelfJoin));
                }
                let (awaited_by, child_state) = match self.processes.get(child) {
                    Some(slot) => (slot.awaited_by, slot.state),
                    None => {
                        return Err(
                            self.process_misuse(process, ProcessMisuseKind::UnknownProcess(child))
                        )
                    }
                };
                if let Some(waiter) = awaited_by {
                    return Err(self.process_misuse(
                        process,
                        ProcessMisuseKind::AlreadyAwaited { child, waiter },
                    ));
                }
                if self.joins_back(child, process) {
                    return Err(self.process_misuse(process, ProcessMisuseKind::JoinCycle(child)));
                }
                if let Some(slot) = self.processes.get_mut(child) {
                    slot.awaited_by = Some(process);
                }
                if child_state == ProcessState::Finished {
                    self.kernel.queue.push(now, process, Wake::Joined(child));
                }
                ProcessState::Waiting(WaitCondition::Join(child))
            }
            Yield::Done => {
                let parent = self.processes.get_mut(process).and_then(|slot| {
                    slot.body = None;
                    slot.awaited_by
                });
                if let Some(parent) = parent {
                    debug!(process = %process, parent = %parent, "Waking awaiting parent");
                    self.kernel.queue.push(now, parent, Wake::Joined(process));
                }
                ProcessState::Finished
            }
        };
        if let Some(slot) = self.processes.get_mut(process) {
            slot.state = state;
        }
        Ok(())
    }

    /// True if `child` is, directly or through further joins, waiting on
    /// `process`.
    fn joins_back(&self, child: ProcessId, process: ProcessId) -> bool {
        let mut next = child;
        for _ in 0..self.processes.len() {
            match self.processes.get(next).map(|slot| slot.state) {
                Some(ProcessState::Waiting(WaitCondition::Join(awaited))) if awaited == process => {
                    return true
                }
                Some(ProcessState::Waiting(WaitCondition::Join(awaited))) => next = awaited,
                _ => return false,
            }
        }
        false
    }

    fn process_misuse(&self, process: ProcessId, kind: ProcessMisuseKind) -> SimulationError {
        SimulationError::ProcessMisuse {
            now: self.now(),
            process: self.processes.reference(process),
            kind,
        }
    }
}

/// What a process sees while it runs.
pub struct Context<'a, M> {
    current: ProcessId,
    now: SimTime,
    kernel: &'a mut Kernel,
    processes: &'a mut ProcessTable<M>,
    model: &'a mut M,
    sink: &'a mut dyn LogSink,
}

impl<M> Context<'_, M> {
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn current(&self) -> ProcessId {
        self.current
    }

    /// The running process, for error reports.
    pub fn this(&self) -> ProcessRef {
        self.processes.reference(self.current)
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut *self.model
    }

    /// Appends `<now>: <message>` to the event log.
    pub fn log(&mut self, message: impl Into<String>) {
        self.sink.append(LogRecord {
            time: self.now,
            message: message.into(),
        });
    }

    /// Starts a new process at the current time, after everything already
    /// queued for this instant.
    pub fn spawn<P>(&mut self, name: impl Into<String>, process: P) -> ProcessId
    where
        P: Process<M> + 'static,
    {
        let name = name.into();
        let id = self.processes.insert(name, Box::new(process));
        self.kernel.queue.push(self.now, id, Wake::Start);
        trace!(parent = %self.current, child = %id, "Process spawned");
        id
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.kernel.resources.get(id.index())
    }

    pub fn process_state(&self, id: ProcessId) -> Option<ProcessState> {
        self.processes.get(id).map(|slot| slot.state)
    }

    /// Returns a grant; freed capacity goes to queued waiters at `now`.
    pub fn release(&mut self, grant: Grant) -> Result<(), SimulationError> {
        let now = self.now;
        let Some(resource) = self.kernel.resources.get_mut(grant.resource().index()) else {
            return Err(SimulationError::ResourceMisuse {
                now,
                process: self.this(),
                resource: "<unknown>".into(),
                kind: MisuseKind::UnknownResource(grant.resource()),
            });
        };
        match resource.release(grant, now) {
            Ok(woken) => {
                for (waiter, handed_over) in woken {
                    debug!(
                        resource = resource.name(),
                        waiter = %waiter,
                        grant = handed_over.id(),
                        "Handing over released unit"
                    );
                    self.kernel
                        .queue
                        .push(now, waiter, Wake::Granted(handed_over));
                }
                Ok(())
            }
            Err(kind) => {
                let resource = resource.name().to_owned();
                Err(SimulationError::ResourceMisuse {
                    now,
                    process: self.this(),
                    resource,
                    kind,
                })
            }
        }
    }

    pub fn exhausted(&self, pool: impl Into<String>) -> SimulationError {
        SimulationError::ExhaustedPool {
            now: self.now,
            process: self.this(),
            pool: pool.into(),
        }
    }

    pub fn invariant(&self, reason: impl Into<String>) -> SimulationError {
        SimulationError::Model {
            now: self.now,
            process: self.this(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{await_process, await_resource, await_timeout};
    use crate::time::SimDuration;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    #[derive(Clone, Copy, Debug)]
    enum Step {
        Log(&'static str),
        Sleep(u32),
        Acquire(ResourceId),
        Release,
    }

    /// Interprets a fixed list of steps.
    struct Script {
        steps: VecDeque<Step>,
        held: Vec<Grant>,
    }

    fn script(steps: &[Step]) -> Script {
        Script {
            steps: steps.iter().copied().collect(),
            held: Vec::new(),
        }
    }

    impl<M> Process<M> for Script {
        fn resume(
            &mut self,
            wake: Wake,
            ctx: &mut Context<'_, M>,
        ) -> Result<Yield, SimulationError> {
            if let Some(grant) = wake.grant() {
                self.held.push(grant);
            }
            while let Some(step) = self.steps.pop_front() {
                match step {
                    Step::Log(message) => ctx.log(message),
                    Step::Sleep(d) => return Ok(await_timeout(SimDuration::from(d))),
                    Step::Acquire(r) => return Ok(await_resource(r)),
                    Step::Release => {
                        let grant = self.held.pop().ok_or_else(|| ctx.invariant("nothing held"))?;
                        ctx.release(grant)?;
                    }
                }
            }
            Ok(Yield::Done)
        }
    }

    /// Spawns a child script and waits for it.
    struct Parent {
        child: Option<Script>,
    }

    impl Process<()> for Parent {
        fn resume(
            &mut self,
            wake: Wake,
            ctx: &mut Context<'_, ()>,
        ) -> Result<Yield, SimulationError> {
            match (wake, self.child.take()) {
                (Wake::Start, Some(child)) => {
                    ctx.log("parent start");
                    let id = ctx.spawn("child", child);
                    Ok(await_process(id))
                }
                (Wake::Joined(_), _) => {
                    ctx.log("parent joined");
                    Ok(Yield::Done)
                }
                _ => Err(ctx.invariant("unexpected wake")),
            }
        }
    }

    /// Pins the closure signature for ad-hoc processes.
    fn body<F>(f: F) -> F
    where
        F: FnMut(Wake, &mut Context<'_, ()>) -> Result<Yield, SimulationError>,
    {
        f
    }

    fn sim() -> Simulation<(), TraceLog> {
        Simulation::new((), TraceLog::new())
    }

    #[test]
    fn timeouts_interleave_by_time() {
        let mut sim = sim();
        sim.spawn(
            "a",
            script(&[Step::Log("a0"), Step::Sleep(2), Step::Log("a2")]),
        );
        sim.spawn(
            "b",
            script(&[Step::Log("b0"), Step::Sleep(1), Step::Log("b1")]),
        );
        let summary = sim.run().unwrap();
        assert_eq!(sim.sink().lines(), vec!["0: a0", "0: b0", "1: b1", "2: a2"]);
        assert_eq!(summary.stop_reason, StopReason::QueueExhausted);
        assert_eq!(summary.final_time, SimTime::from(2));
        assert_eq!(summary.unfinished_processes, 0);
    }

    #[test]
    fn contended_resource_serves_in_request_order() {
        let mut sim = sim();
        let dock = sim.add_resource("dock", 1);
        for name in ["first", "second", "third"] {
            sim.spawn(
                name,
                script(&[Step::Acquire(dock), Step::Log(name), Step::Sleep(2), Step::Release]),
            );
        }
        sim.run().unwrap();
        assert_eq!(sim.sink().lines(), vec!["0: first", "2: second", "4: third"]);
        let stats = sim.resource(dock).unwrap().stats();
        assert_eq!(stats.granted, 3);
        assert_eq!(stats.peak_in_use, 1);
        assert_eq!(stats.peak_queue, 2);
        assert_eq!(stats.total_wait.as_f64(), 2.0 + 4.0);
    }

    #[test]
    fn late_arrival_at_release_instant_queues_behind_waiter() {
        let mut sim = sim();
        let dock = sim.add_resource("dock", 1);
        sim.spawn(
            "a",
            script(&[
                Step::Acquire(dock),
                Step::Sleep(5),
                Step::Log("a leaves"),
                Step::Release,
            ]),
        );
        sim.spawn(
            "b",
            script(&[
                Step::Acquire(dock),
                Step::Log("b in"),
                Step::Sleep(1),
                Step::Release,
            ]),
        );
        // c shows up exactly when a releases, and its request is processed first.
        sim.spawn(
            "c",
            script(&[
                Step::Sleep(5),
                Step::Acquire(dock),
                Step::Log("c in"),
                Step::Release,
            ]),
        );
        sim.run().unwrap();
        assert_eq!(sim.sink().lines(), vec!["5: a leaves", "5: b in", "6: c in"]);
    }

    #[test]
    fn parent_resumes_when_child_finishes() {
        let mut sim = sim();
        let parent = sim.spawn(
            "parent",
            Parent {
                child: Some(script(&[Step::Sleep(3), Step::Log("child done")])),
            },
        );
        sim.run().unwrap();
        assert_eq!(
            sim.sink().lines(),
            vec!["0: parent start", "3: child done", "3: parent joined"]
        );
        assert_eq!(sim.process_state(parent), Some(ProcessState::Finished));
        assert_eq!(sim.process_count(), 2);
    }

    #[test]
    fn self_join_is_rejected() {
        let mut sim = sim();
        sim.spawn("narcissus", body(|_, ctx| Ok(await_process(ctx.current()))));
        let err = sim.run().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ProcessMisuse {
                kind: ProcessMisuseKind::SelfJoin,
                ..
            }
        ));
    }

    #[test]
    fn join_cycle_is_rejected() {
        let mut sim = sim();
        sim.spawn(
            "a",
            body(|wake, ctx| match wake {
                Wake::Start => {
                    let a = ctx.current();
                    let b = ctx.spawn("b", body(move |_, _| Ok(await_process(a))));
                    Ok(await_process(b))
                }
                _ => Ok(Yield::Done),
            }),
        );
        let err = sim.run().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ProcessMisuse {
                kind: ProcessMisuseKind::JoinCycle(_),
                ..
            }
        ));
    }

    #[test]
    fn second_waiter_is_rejected() {
        let mut sim = sim();
        let target = sim.spawn("target", script(&[Step::Sleep(10)]));
        sim.spawn("w1", body(move |_, _| Ok(await_process(target))));
        sim.spawn("w2", body(move |_, _| Ok(await_process(target))));
        let err = sim.run().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ProcessMisuse {
                kind: ProcessMisuseKind::AlreadyAwaited { .. },
                ..
            }
        ));
    }

    #[test]
    fn joining_finished_process_resumes_immediately() {
        let mut sim = sim();
        let quick = sim.spawn("quick", script(&[Step::Log("quick")]));
        let mut joined = false;
        sim.spawn("late", body(move |wake, ctx| {
            if joined {
                ctx.log(format!("{wake:?}"));
                return Ok(Yield::Done);
            }
            joined = true;
            Ok(await_process(quick))
        }));
        sim.run().unwrap();
        assert_eq!(sim.sink().lines()[1], format!("0: {:?}", Wake::Joined(quick)));
    }

    #[test]
    fn double_release_aborts_with_context() {
        let mut sim = sim();
        let dock = sim.add_resource("dock", 1);
        let mut grant = None;
        sim.spawn("sloppy", body(move |wake, ctx| {
            if let Some(g) = wake.grant() {
                grant = Some(g);
            }
            match grant {
                None => Ok(await_resource(dock)),
                Some(g) => {
                    ctx.release(g)?;
                    ctx.release(g)?;
                    Ok(Yield::Done)
                }
            }
        }));
        match sim.run().unwrap_err() {
            SimulationError::ResourceMisuse {
                resource, kind, process, ..
            } => {
                assert_eq!(resource, "dock");
                assert!(matches!(kind, MisuseKind::NotHeld { .. }));
                assert_eq!(process.name, "sloppy");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(sim.resource(dock).unwrap().in_use(), 0);
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let mut sim = sim();
        sim.spawn(
            "rewinder",
            body(|_, _| Ok(await_timeout(SimDuration::new(-1.0)))),
        );
        assert!(matches!(
            sim.run().unwrap_err(),
            SimulationError::ProcessMisuse {
                kind: ProcessMisuseKind::InvalidDuration(_),
                ..
            }
        ));
    }

    #[test]
    fn overflowing_timeout_is_a_causality_error() {
        let mut sim = sim();
        sim.spawn(
            "far",
            body(|_, ctx| {
                ctx.log("woke");
                Ok(await_timeout(SimDuration::new(f64::MAX)))
            }),
        );
        let err = sim.run().unwrap_err();
        assert!(matches!(err, SimulationError::Causality { .. }));
        assert_eq!(sim.now(), SimTime::new(f64::MAX));
        assert_eq!(sim.sink().lines().len(), 2);
        assert!(sim.now().is_valid());
    }

    #[test]
    fn scheduling_into_the_past_is_a_causality_error() {
        let mut sim = sim();
        let p = sim.spawn("sleeper", script(&[Step::Sleep(4)]));
        sim.run_until(SimTime::from(2)).unwrap();
        let err = sim.schedule(SimTime::from(1), p, Wake::Timeout).unwrap_err();
        assert!(matches!(err, SimulationError::Causality { .. }));
        assert!(sim.schedule(SimTime::from(3), p, Wake::Timeout).is_ok());
    }

    #[test]
    fn horizon_stops_run_and_abandons_processes() {
        let mut sim = sim();
        let p = sim.spawn(
            "long",
            script(&[
                Step::Log("start"),
                Step::Sleep(5),
                Step::Log("at five"),
                Step::Sleep(5),
                Step::Log("never"),
            ]),
        );
        let summary = sim.run_until(SimTime::from(5)).unwrap();
        assert_eq!(sim.sink().lines(), vec!["0: start", "5: at five"]);
        assert_eq!(summary.stop_reason, StopReason::HorizonReached);
        assert_eq!(summary.final_time, SimTime::from(5));
        assert_eq!(summary.pending_events, 1);
        assert_eq!(summary.unfinished_processes, 1);
        assert!(matches!(
            sim.process_state(p),
            Some(ProcessState::Waiting(WaitCondition::Timeout { .. }))
        ));
    }

    #[test]
    fn clock_moves_to_horizon_when_queue_drains_early() {
        let mut sim = sim();
        sim.spawn("short", script(&[Step::Sleep(1)]));
        let summary = sim.run_until(SimTime::from(10)).unwrap();
        assert_eq!(summary.stop_reason, StopReason::QueueExhausted);
        assert_eq!(summary.final_time, SimTime::from(10));
    }

    #[test]
    fn builder_registers_resources_before_the_model() {
        let mut builder = SimulationBuilder::new(TraceLog::new());
        let dock = builder.add_resource("dock", 1);
        let mut sim = builder.build(dock);
        sim.spawn("user", borrow_model_resource());
        sim.run().unwrap();
        assert_eq!(sim.sink().lines(), vec!["0: got r0"]);
        assert_eq!(sim.resource(dock).unwrap().stats().granted, 1);
    }

    /// Requests whichever resource the model names.
    fn borrow_model_resource(
    ) -> impl FnMut(Wake, &mut Context<'_, ResourceId>) -> Result<Yield, SimulationError> {
        |wake, ctx| match wake.grant() {
            None => Ok(await_resource(*ctx.model())),
            Some(grant) => {
                ctx.log(format!("got {}", grant.resource()));
                ctx.release(grant)?;
                Ok(Yield::Done)
            }
        }
    }

    #[test]
    fn zero_capacity_stalls_instead_of_failing() {
        let mut sim = sim();
        let none = sim.add_resource("cranes", 0);
        let p = sim.spawn(
            "stuck",
            script(&[Step::Acquire(none), Step::Log("unreachable")]),
        );
        let summary = sim.run().unwrap();
        assert!(sim.sink().lines().is_empty());
        assert_eq!(summary.unfinished_processes, 1);
        assert_eq!(
            sim.process_state(p),
            Some(ProcessState::Waiting(WaitCondition::Resource(none)))
        );
    }

    proptest! {
        #[test]
        fn log_times_never_decrease(
            sleeps in prop::collection::vec(prop::collection::vec(0u32..20, 0..6), 1..8)
        ) {
            let mut sim = sim();
            let dock = sim.add_resource("dock", 2);
            for (n, plan) in sleeps.iter().enumerate() {
                let mut steps = vec![Step::Acquire(dock)];
                for d in plan {
                    steps.push(Step::Sleep(*d));
                    steps.push(Step::Log("tick"));
                }
                steps.push(Step::Release);
                sim.spawn(format!("p{n}"), script(&steps));
            }
            sim.run().unwrap();
            let times: Vec<SimTime> = sim.sink().records().iter().map(|r| r.time).collect();
            prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(sim.resource(dock).unwrap().in_use(), 0);
        }
    }
}
