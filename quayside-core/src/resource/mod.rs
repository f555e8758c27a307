//! ## quayside-core::resource
//! **Capacity-limited, FIFO-queued shared assets**
//!
//! A `Resource` hands out `Grant`s while `in_use < capacity` and queues every
//! other request in arrival order. Releasing a grant frees one unit and passes
//! it straight to the head of the queue, so a later requester can never
//! overtake an earlier one.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::process::ProcessId;
use crate::time::{SimDuration, SimTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(usize);

impl ResourceId {
    pub(crate) fn from_raw(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Token for one unit of a resource. Required to release it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grant {
    resource: ResourceId,
    id: u64,
}

impl Grant {
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Outcome of `Resource::request`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Granted(Grant),
    /// Queued behind `position` earlier waiters.
    Queued { position: usize },
}

/// A requester still waiting for capacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingRequest {
    pub process: ProcessId,
    pub requested_at: SimTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MisuseKind {
    #[error("grant {grant} is not currently held (double release or never granted)")]
    NotHeld { grant: u64 },

    #[error("grant was issued by resource {found}, not {expected}")]
    ForeignGrant {
        expected: ResourceId,
        found: ResourceId,
    },

    #[error("unknown resource {0}")]
    UnknownResource(ResourceId),
}

/// Counters kept over the lifetime of a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ResourceStats {
    pub granted: u64,
    pub released: u64,
    pub peak_in_use: usize,
    pub peak_queue: usize,
    /// Sum of the time granted requests spent queued.
    pub total_wait: SimDuration,
}

#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    name: String,
    capacity: usize,
    in_use: usize,
    holders: BTreeMap<u64, ProcessId>,
    wait_queue: VecDeque<PendingRequest>,
    next_grant: u64,
    stats: ResourceStats,
}

impl Resource {
    /// A capacity of zero is accepted; every request then waits forever.
    pub fn new(id: ResourceId, name: impl Into<String>, capacity: usize) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            in_use: 0,
            holders: BTreeMap::new(),
            wait_queue: VecDeque::new(),
            next_grant: 0,
            stats: ResourceStats::default(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of requesters currently waiting.
    pub fn queue_len(&self) -> usize {
        self.wait_queue.len()
    }

    pub fn waiting(&self) -> impl Iterator<Item = &PendingRequest> {
        self.wait_queue.iter()
    }

    /// Processes currently holding a grant, in grant order.
    pub fn holders(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.holders.values().copied()
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    pub fn request(&mut self, process: ProcessId, now: SimTime) -> Request {
        if self.in_use < self.capacity && self.wait_queue.is_empty() {
            return Request::Granted(self.issue(process, now, now));
        }
        let position = self.wait_queue.len();
        self.wait_queue.push_back(PendingRequest {
            process,
            requested_at: now,
        });
        self.stats.peak_queue = self.stats.peak_queue.max(self.wait_queue.len());
        Request::Queued { position }
    }

    /// Returns one unit and hands freed capacity to queued requesters.
    ///
    /// The returned waiters must be woken at `now`, in order.
    pub fn release(
        &mut self,
        grant: Grant,
        now: SimTime,
    ) -> Result<Vec<(ProcessId, Grant)>, MisuseKind> {
        if grant.resource != self.id {
            return Err(MisuseKind::ForeignGrant {
                expected: self.id,
                found: grant.resource,
            });
        }
        if self.holders.remove(&grant.id).is_none() {
            return Err(MisuseKind::NotHeld { grant: grant.id });
        }
        self.in_use -= 1;
        self.stats.released += 1;

        let mut woken = Vec::new();
        while self.in_use < self.capacity {
            let Some(pending) = self.wait_queue.pop_front() else {
                break;
            };
            let grant = self.issue(pending.process, pending.requested_at, now);
            woken.push((pending.process, grant));
        }
        Ok(woken)
    }

    fn issue(&mut self, process: ProcessId, requested_at: SimTime, now: SimTime) -> Grant {
        let grant = Grant {
            resource: self.id,
            id: self.next_grant,
        };
        self.next_grant += 1;
        self.in_use += 1;
        self.holders.insert(grant.id, process);
        self.stats.granted += 1;
        self.stats.peak_in_use = self.stats.peak_in_use.max(self.in_use);
        self.stats.total_wait += now.duration_since(requested_at);
        debug_assert!(self.in_use <= self.capacity);
        grant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pid(n: usize) -> ProcessId {
        ProcessId::from_raw(n)
    }

    fn berth(capacity: usize) -> Resource {
        Resource::new(ResourceId::from_raw(0), "berths", capacity)
    }

    fn granted(request: Request) -> Grant {
        match request {
            Request::Granted(grant) => grant,
            other => panic!("expected grant, got {other:?}"),
        }
    }

    #[test]
    fn grants_until_capacity_then_queues() {
        let mut r = berth(2);
        let now = SimTime::ZERO;
        granted(r.request(pid(0), now));
        granted(r.request(pid(1), now));
        assert_eq!(r.request(pid(2), now), Request::Queued { position: 0 });
        assert_eq!(r.request(pid(3), now), Request::Queued { position: 1 });
        assert_eq!(r.in_use(), 2);
        assert_eq!(r.queue_len(), 2);
    }

    #[test]
    fn release_hands_over_in_fifo_order() {
        let mut r = berth(1);
        let first = granted(r.request(pid(0), SimTime::ZERO));
        r.request(pid(1), SimTime::from(1));
        r.request(pid(2), SimTime::from(2));

        let woken = r.release(first, SimTime::from(5)).unwrap();
        assert_eq!(woken.len(), 1);
        assert_eq!(woken[0].0, pid(1));
        assert_eq!(r.in_use(), 1);
        assert_eq!(r.holders().collect::<Vec<_>>(), vec![pid(1)]);

        let woken = r.release(woken[0].1, SimTime::from(6)).unwrap();
        assert_eq!(woken[0].0, pid(2));
        assert_eq!(r.stats().total_wait.as_f64(), 4.0 + 4.0);
    }

    #[test]
    fn new_request_cannot_jump_waiters() {
        let mut r = berth(1);
        let first = granted(r.request(pid(0), SimTime::ZERO));
        r.request(pid(1), SimTime::ZERO);
        let woken = r.release(first, SimTime::from(3)).unwrap();
        assert_eq!(woken[0].0, pid(1));
        // A same-instant newcomer finds the unit already handed over.
        assert_eq!(
            r.request(pid(2), SimTime::from(3)),
            Request::Queued { position: 0 }
        );
    }

    #[test]
    fn double_release_is_misuse() {
        let mut r = berth(1);
        let grant = granted(r.request(pid(0), SimTime::ZERO));
        r.release(grant, SimTime::ZERO).unwrap();
        assert_eq!(
            r.release(grant, SimTime::ZERO),
            Err(MisuseKind::NotHeld { grant: grant.id() })
        );
        assert_eq!(r.in_use(), 0);
    }

    #[test]
    fn foreign_grant_is_misuse() {
        let mut a = berth(1);
        let mut b = Resource::new(ResourceId::from_raw(1), "cranes", 1);
        let grant = granted(b.request(pid(0), SimTime::ZERO));
        assert!(matches!(
            a.release(grant, SimTime::ZERO),
            Err(MisuseKind::ForeignGrant { .. })
        ));
        assert_eq!(b.in_use(), 1);
    }

    #[test]
    fn zero_capacity_only_queues() {
        let mut r = berth(0);
        assert_eq!(
            r.request(pid(0), SimTime::ZERO),
            Request::Queued { position: 0 }
        );
        assert_eq!(r.in_use(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Request,
        Release(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Request), (0usize..8).prop_map(Op::Release)]
    }

    proptest! {
        #[test]
        fn capacity_and_fifo_hold_under_random_traffic(
            capacity in 1usize..4,
            ops in prop::collection::vec(op(), 1..120),
        ) {
            let mut r = berth(capacity);
            let mut held: Vec<(ProcessId, Grant)> = Vec::new();
            let mut queued: VecDeque<ProcessId> = VecDeque::new();
            let mut next = 0usize;

            for op in ops {
                match op {
                    Op::Request => {
                        let p = pid(next);
                        next += 1;
                        match r.request(p, SimTime::ZERO) {
                            Request::Granted(g) => held.push((p, g)),
                            Request::Queued { .. } => queued.push_back(p),
                        }
                    }
                    Op::Release(i) if !held.is_empty() => {
                        let (_, grant) = held.remove(i % held.len());
                        for (p, g) in r.release(grant, SimTime::ZERO).unwrap() {
                            prop_assert_eq!(Some(p), queued.pop_front());
                            held.push((p, g));
                        }
                    }
                    Op::Release(_) => {}
                }
                prop_assert!(r.in_use() <= r.capacity());
                prop_assert_eq!(r.in_use(), held.len());
                prop_assert_eq!(r.queue_len(), queued.len());
                let mut holders: Vec<_> = r.holders().collect();
                let mut expected: Vec<_> = held.iter().map(|(p, _)| *p).collect();
                holders.sort();
                expected.sort();
                prop_assert_eq!(holders, expected);
            }
        }
    }
}
