//! ## quayside-core::events
//! **Time-ordered queue of pending process wake-ups**
//!
//! Events are ordered by `(time, sequence)`. The sequence number is assigned
//! at insertion, so events sharing a timestamp pop in the order they were
//! scheduled. That tie-break is what makes a run replayable for a fixed seed.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::process::{ProcessId, Wake};
use crate::time::SimTime;

/// A scheduled resumption of one process.
#[derive(Clone, Debug)]
pub struct Event {
    pub time: SimTime,
    pub sequence: u64,
    pub process: ProcessId,
    pub wake: Wake,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Min-queue of events keyed by `(time, sequence)`.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a wake-up and returns its sequence number.
    pub fn push(&mut self, time: SimTime, process: ProcessId, wake: Wake) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Event {
            time,
            sequence,
            process,
            wake,
        }));
        sequence
    }

    /// Removes the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total number of events ever scheduled.
    pub fn scheduled(&self) -> u64 {
        self.next_sequence
    }
}
