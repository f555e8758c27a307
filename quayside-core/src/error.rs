use thiserror::Error;

use crate::process::{ProcessId, ProcessRef};
use crate::resource::MisuseKind;
use crate::time::{SimDuration, SimTime};

/// Contract violations that abort a run. None of these are transient.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("causality violation for {process}: event at {requested} but clock reads {now}")]
    Causality {
        now: SimTime,
        requested: SimTime,
        process: ProcessRef,
    },

    #[error("resource misuse at {now} by {process} on '{resource}': {kind}")]
    ResourceMisuse {
        now: SimTime,
        process: ProcessRef,
        resource: String,
        kind: MisuseKind,
    },

    #[error("pool '{pool}' exhausted at {now}: {process} found no available item")]
    ExhaustedPool {
        now: SimTime,
        process: ProcessRef,
        pool: String,
    },

    #[error("process misuse at {now} by {process}: {kind}")]
    ProcessMisuse {
        now: SimTime,
        process: ProcessRef,
        kind: ProcessMisuseKind,
    },

    #[error("model invariant violated at {now} in {process}: {reason}")]
    Model {
        now: SimTime,
        process: ProcessRef,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessMisuseKind {
    #[error("a process cannot await itself")]
    SelfJoin,

    #[error("unknown process {0}")]
    UnknownProcess(ProcessId),

    #[error("process {child} is already awaited by {waiter}")]
    AlreadyAwaited { child: ProcessId, waiter: ProcessId },

    #[error("awaiting {0} would close a join cycle")]
    JoinCycle(ProcessId),

    #[error("finished process was resumed")]
    ResumedFinished,

    #[error("invalid timeout duration {0:?}")]
    InvalidDuration(SimDuration),
}
