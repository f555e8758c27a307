//! ## quayside-core::time
//! **Simulated instants, spans and the virtual clock**
//!
//! Simulated time is an abstract monotonic quantity advanced only by the
//! scheduler. It has no relation to wall-clock time.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A point in simulated time.
///
/// Equality and ordering use `f64::total_cmp`, so `SimTime` is `Eq + Ord` and
/// can key an event heap. Constructors fold `-0.0` into `0.0`.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn new(value: f64) -> Self {
        Self(value + 0.0)
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Whether this instant can be placed on the event queue.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// Span elapsed since `earlier`, clamped at zero.
    #[inline]
    pub fn duration_since(self, earlier: SimTime) -> SimDuration {
        SimDuration::new((self.0 - earlier.0).max(0.0))
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for SimTime {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

/// A span of simulated time.
#[derive(Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimDuration(f64);

impl SimDuration {
    pub const ZERO: SimDuration = SimDuration(0.0);

    #[inline]
    pub fn new(value: f64) -> Self {
        Self(value + 0.0)
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Finite and non-negative. Anything else is rejected by the scheduler.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

impl fmt::Debug for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}u", self.0)
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for SimDuration {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl Add<SimDuration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimDuration) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl Add for SimDuration {
    type Output = SimDuration;

    fn add(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0 + rhs.0)
    }
}

impl AddAssign for SimDuration {
    fn add_assign(&mut self, rhs: SimDuration) {
        self.0 += rhs.0;
    }
}

/// Returned when the clock is asked to move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewind {
    pub now: SimTime,
    pub requested: SimTime,
}

/// The simulation's current time. Only ever moves forward.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: SimTime,
}

impl VirtualClock {
    /// Creates a clock reading `start`.
    pub fn new(start: SimTime) -> Self {
        Self { now: start }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Moves the clock to `at`. Equal times are allowed.
    #[inline]
    pub fn advance_to(&mut self, at: SimTime) -> Result<(), Rewind> {
        if at < self.now {
            return Err(Rewind {
                now: self.now,
                requested: at,
            });
        }
        self.now = at;
        Ok(())
    }
}
