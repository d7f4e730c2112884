// src/services/delay.rs

//! Randomized pause between search terms.

use std::time::Duration;

use crate::models::CollectorConfig;

/// Uniform random delay in `[min_ms, max_ms]`.
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    min_ms: u64,
    max_ms: u64,
    rng: fastrand::Rng,
}

impl DelayPolicy {
    /// Entropy-seeded policy. Bounds given in the wrong order are swapped.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self::with_rng(min_ms, max_ms, fastrand::Rng::new())
    }

    /// Reproducible policy for tests.
    pub fn seeded(min_ms: u64, max_ms: u64, seed: u64) -> Self {
        Self::with_rng(min_ms, max_ms, fastrand::Rng::with_seed(seed))
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(config.delay_min_ms, config.delay_max_ms)
    }

    fn with_rng(min_ms: u64, max_ms: u64, rng: fastrand::Rng) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
            rng,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.u64(self.min_ms..=self.max_ms))
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let mut policy = DelayPolicy::seeded(3000, 5000, 7);
        for _ in 0..200 {
            let delay = policy.next_delay().as_millis();
            assert!((3000..=5000).contains(&delay), "{delay}");
        }
    }

    #[test]
    fn test_seeded_policy_is_reproducible() {
        let mut a = DelayPolicy::seeded(0, 10_000, 42);
        let mut b = DelayPolicy::seeded(0, 10_000, 42);
        let first: Vec<_> = (0..5).map(|_| a.next_delay()).collect();
        let second: Vec<_> = (0..5).map(|_| b.next_delay()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_swapped_bounds_and_none() {
        let mut policy = DelayPolicy::seeded(50, 10, 1);
        let delay = policy.next_delay().as_millis();
        assert!((10..=50).contains(&delay));

        let mut none = DelayPolicy::none();
        assert!(none.is_zero());
        assert_eq!(none.next_delay(), Duration::ZERO);
    }
}
