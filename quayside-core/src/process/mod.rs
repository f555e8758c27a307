//! ## quayside-core::process
//! **The suspension protocol**
//!
//! A process is an explicit state machine. The scheduler calls
//! [`Process::resume`] with the reason it woke up; the process runs until its
//! next suspension point and returns a [`Yield`] naming what it waits for.
//! Nothing else runs while a process segment executes, so a process may
//! read and mutate the shared model freely between suspension points.

use std::fmt;

use serde::Serialize;

use crate::error::SimulationError;
use crate::resource::{Grant, ResourceId};
use crate::sim::Context;
use crate::time::{SimDuration, SimTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProcessId(usize);

impl ProcessId {
    pub(crate) fn from_raw(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process id together with its name, for error reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRef {
    pub id: ProcessId,
    pub name: String,
}

impl fmt::Display for ProcessRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Why a process is being resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    /// First activation after `spawn`.
    Start,
    /// A requested timeout elapsed.
    Timeout,
    /// A resource request was satisfied.
    Granted(Grant),
    /// The awaited child process finished.
    Joined(ProcessId),
}

impl Wake {
    pub fn grant(self) -> Option<Grant> {
        match self {
            Wake::Granted(grant) => Some(grant),
            _ => None,
        }
    }
}

/// What a process returns at a suspension point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Yield {
    Timeout(SimDuration),
    Resource(ResourceId),
    Join(ProcessId),
    Done,
}

/// Resume at `now + duration`.
pub fn await_timeout(duration: SimDuration) -> Yield {
    Yield::Timeout(duration)
}

/// Resume once `resource` grants a unit. The grant arrives as `Wake::Granted`.
pub fn await_resource(resource: ResourceId) -> Yield {
    Yield::Resource(resource)
}

/// Resume once `child` has finished.
pub fn await_process(child: ProcessId) -> Yield {
    Yield::Join(child)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaitCondition {
    Timeout { until: SimTime },
    Resource(ResourceId),
    Join(ProcessId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProcessState {
    /// Spawned and not yet started, or currently executing.
    Runnable,
    Waiting(WaitCondition),
    Finished,
}

pub trait Process<M> {
    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_, M>) -> Result<Yield, SimulationError>;
}

impl<M, F> Process<M> for F
where
    F: FnMut(Wake, &mut Context<'_, M>) -> Result<Yield, SimulationError>,
{
    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_, M>) -> Result<Yield, SimulationError> {
        self(wake, ctx)
    }
}

pub(crate) struct Slot<M> {
    pub(crate) name: String,
    pub(crate) state: ProcessState,
    pub(crate) body: Option<Box<dyn Process<M>>>,
    pub(crate) awaited_by: Option<ProcessId>,
}

/// Every process ever spawned in a run, indexed by `ProcessId`.
pub(crate) struct ProcessTable<M> {
    slots: Vec<Slot<M>>,
}

impl<M> ProcessTable<M> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn insert(&mut self, name: String, body: Box<dyn Process<M>>) -> ProcessId {
        let id = ProcessId::from_raw(self.slots.len());
        self.slots.push(Slot {
            name,
            state: ProcessState::Runnable,
            body: Some(body),
            awaited_by: None,
        });
        id
    }

    pub(crate) fn get(&self, id: ProcessId) -> Option<&Slot<M>> {
        self.slots.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ProcessId) -> Option<&mut Slot<M>> {
        self.slots.get_mut(id.0)
    }

    pub(crate) fn reference(&self, id: ProcessId) -> ProcessRef {
        ProcessRef {
            id,
            name: self
                .get(id)
                .map(|slot| slot.name.clone())
                .unwrap_or_else(|| "<unknown>".into()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn unfinished(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state != ProcessState::Finished)
            .count()
    }
}
