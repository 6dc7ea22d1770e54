//! Random flip intervals.

use std::ops::Range;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SignalConfig;

/// Draws phase durations uniformly from a half-open range.
#[derive(Debug)]
pub struct IntervalSampler<R = StdRng> {
    rng: R,
    range: Range<Duration>,
}

impl IntervalSampler<StdRng> {
    /// Builds a sampler for `config`, seeded from `config.seed` or from OS
    /// entropy when no seed is set.
    ///
    /// # Panics
    ///
    /// Panics if the config's interval range is empty. Validated configs
    /// never are.
    #[must_use]
    pub fn from_config(config: &SignalConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, config.min_interval..config.max_interval)
    }
}

impl<R: Rng> IntervalSampler<R> {
    /// Creates a sampler drawing from `range` with `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is empty.
    #[must_use]
    pub fn new(rng: R, range: Range<Duration>) -> Self {
        assert!(range.start < range.end, "interval range must be non-empty");
        Self { rng, range }
    }

    /// Draws the next interval. Always lies in `range.start..range.end`.
    pub fn next_interval(&mut self) -> Duration {
        self.rng.gen_range(self.range.clone())
    }

    #[must_use]
    pub fn range(&self) -> &Range<Duration> {
        &self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: usize = 10_000;

    fn seeded(seed: u64) -> IntervalSampler {
        IntervalSampler::from_config(&SignalConfig {
            seed: Some(seed),
            ..SignalConfig::default()
        })
    }

    #[test]
    fn test_samples_stay_in_range() {
        let mut sampler = seeded(7);
        let range = sampler.range().clone();

        let mut lowest = Duration::MAX;
        let mut highest = Duration::ZERO;
        let mut total = Duration::ZERO;
        for _ in 0..SAMPLES {
            let interval = sampler.next_interval();
            assert!(range.contains(&interval), "{interval:?} outside {range:?}");
            lowest = lowest.min(interval);
            highest = highest.max(interval);
            total += interval;
        }

        // Uniform over 2s: both ends get visited and the mean sits mid-range.
        assert!(lowest < Duration::from_millis(4050), "lowest {lowest:?}");
        assert!(highest > Duration::from_millis(5950), "highest {highest:?}");
        let mean = total / SAMPLES as u32;
        assert!(
            (Duration::from_millis(4950)..Duration::from_millis(5050)).contains(&mean),
            "mean {mean:?}"
        );
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = seeded(42);
        let mut b = seeded(42);

        for _ in 0..100 {
            assert_eq!(a.next_interval(), b.next_interval());
        }
    }

    #[test]
    fn test_custom_rng_and_range() {
        let range = Duration::from_millis(1)..Duration::from_millis(2);
        let mut sampler = IntervalSampler::new(StdRng::seed_from_u64(1), range.clone());

        for _ in 0..100 {
            assert!(range.contains(&sampler.next_interval()));
        }
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn test_empty_range_panics() {
        let at = Duration::from_millis(5);
        let _ = IntervalSampler::new(StdRng::seed_from_u64(1), at..at);
    }
}
