//! # Arrival Models
//!
//! Sources of inter-arrival intervals for the vessel generator.
//!
//! ## Models:
//! - `ExponentialArrivals`: seeded exponential draws with a configured mean.
//! - `FixedArrivals`: the same interval every time.
//! - `ScriptedArrivals`: a recorded list of intervals, for exact scenarios.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};
use thiserror::Error;

use quayside_core::time::SimDuration;

#[derive(Debug, Error, PartialEq)]
pub enum ArrivalError {
    #[error("mean inter-arrival interval must be finite and positive, got {0}")]
    InvalidMean(f64),
}

/// Trait for arrival models.
pub trait ArrivalModel: Send {
    /// Time until the next arrival attempt.
    fn next_interval(&mut self) -> SimDuration;
}

impl<A: ArrivalModel + ?Sized> ArrivalModel for Box<A> {
    fn next_interval(&mut self) -> SimDuration {
        (**self).next_interval()
    }
}

/// Exponential inter-arrival times (a Poisson arrival process).
///
/// ChaCha8 keeps the stream identical across platforms for a given seed.
#[derive(Debug, Clone)]
pub struct ExponentialArrivals {
    distribution: Exp<f64>,
    rng: ChaCha8Rng,
}

impl ExponentialArrivals {
    pub fn new(mean_interval: f64, seed: u64) -> Result<Self, ArrivalError> {
        if !(mean_interval.is_finite() && mean_interval > 0.0) {
            return Err(ArrivalError::InvalidMean(mean_interval));
        }
        let distribution =
            Exp::new(1.0 / mean_interval).map_err(|_| ArrivalError::InvalidMean(mean_interval))?;
        Ok(Self {
            distribution,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }
}

impl ArrivalModel for ExponentialArrivals {
    #[inline]
    fn next_interval(&mut self) -> SimDuration {
        SimDuration::new(self.distribution.sample(&mut self.rng))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedArrivals(pub SimDuration);

impl ArrivalModel for FixedArrivals {
    #[inline]
    fn next_interval(&mut self) -> SimDuration {
        self.0
    }
}

/// Replays the given intervals, then repeats the last one.
#[derive(Debug, Clone)]
pub struct ScriptedArrivals {
    remaining: VecDeque<SimDuration>,
    last: SimDuration,
}

impl ScriptedArrivals {
    pub fn new(intervals: impl IntoIterator<Item = SimDuration>) -> Self {
        Self {
            remaining: intervals.into_iter().collect(),
            last: SimDuration::ZERO,
        }
    }
}

impl ArrivalModel for ScriptedArrivals {
    fn next_interval(&mut self) -> SimDuration {
        if let Some(next) = self.remaining.pop_front() {
            self.last = next;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = ExponentialArrivals::new(300.0, 42).unwrap();
        let mut b = ExponentialArrivals::new(300.0, 42).unwrap();
        for _ in 0..32 {
            assert_eq!(a.next_interval(), b.next_interval());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = ExponentialArrivals::new(300.0, 1).unwrap();
        let mut b = ExponentialArrivals::new(300.0, 2).unwrap();
        let a: Vec<_> = (0..8).map(|_| a.next_interval()).collect();
        let b: Vec<_> = (0..8).map(|_| b.next_interval()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn sample_mean_is_near_configured_mean() {
        let mut model = ExponentialArrivals::new(300.0, 7).unwrap();
        let n = 20_000;
        let total: f64 = (0..n).map(|_| model.next_interval().as_f64()).sum();
        let mean = total / n as f64;
        assert!((mean - 300.0).abs() < 15.0, "sample mean {mean}");
    }

    #[test]
    fn invalid_means_are_rejected() {
        assert_eq!(
            ExponentialArrivals::new(0.0, 1).unwrap_err(),
            ArrivalError::InvalidMean(0.0)
        );
        assert!(ExponentialArrivals::new(f64::NAN, 1).is_err());
    }

    #[test]
    fn scripted_repeats_last_interval() {
        let mut model = ScriptedArrivals::new([SimDuration::ZERO, SimDuration::from(3)]);
        assert_eq!(model.next_interval(), SimDuration::ZERO);
        assert_eq!(model.next_interval(), SimDuration::from(3));
        assert_eq!(model.next_interval(), SimDuration::from(3));
    }

    proptest! {
        #[test]
        fn exponential_draws_are_valid_durations(seed in any::<u64>(), mean in 0.5f64..5_000.0) {
            let mut model = ExponentialArrivals::new(mean, seed).unwrap();
            for _ in 0..16 {
                prop_assert!(model.next_interval().is_valid());
            }
        }
    }
}
