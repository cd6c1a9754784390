//! Randomized Interval Sampling
//!
//! Blink and gaze scheduling draw their intervals from a bounded range. The
//! engine takes a sampler instead of touching a global RNG so tests can pin
//! the sequence with a seed.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::time::Millis;

/// Bounded-range sampler used for animation scheduling
pub trait IntervalSampler: Send {
    /// Draw uniformly from `range` (both ends inclusive)
    fn sample(&mut self, range: RangeInclusive<Millis>) -> Millis;

    /// Fair coin flip
    fn coin(&mut self) -> bool;
}

/// [`IntervalSampler`] over any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<StdRng> {
    /// Deterministic sampler
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Sampler seeded from OS entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> IntervalSampler for RngSampler<R> {
    fn sample(&mut self, range: RangeInclusive<Millis>) -> Millis {
        if range.is_empty() {
            return *range.start();
        }
        self.rng.gen_range(range)
    }

    fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Build the default sampler: seeded when a seed is given, entropy otherwise
#[must_use]
pub fn sampler_from_seed(seed: Option<u64>) -> Box<dyn IntervalSampler> {
    match seed {
        Some(seed) => Box::new(RngSampler::seeded(seed)),
        None => Box::new(RngSampler::from_entropy()),
    }
}
