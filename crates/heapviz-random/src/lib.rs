//! Random heap contents for heapviz.
//!
//! Wraps a seedable `StdRng` so that demos and tests can reproduce the same
//! "random heap" from a fixed seed.

use heapviz_config::RandomConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A random source for heap contents.
#[derive(Debug, Clone)]
pub struct HeapGenerator {
    rng: StdRng,
    min_len: usize,
    max_len: usize,
    max_value: i64,
}

impl HeapGenerator {
    /// Build from configuration. Uses the configured seed when present,
    /// OS entropy otherwise. Lengths are clamped to [`RandomConfig::MAX_LEN`].
    pub fn from_config(config: &RandomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            min_len: config.min_len.min(config.max_len).min(RandomConfig::MAX_LEN),
            max_len: config.max_len.min(RandomConfig::MAX_LEN),
            max_value: config.max_value.max(0),
        }
    }

    /// A length in `min_len..=max_len`.
    pub fn draw_len(&mut self) -> usize {
        self.rng.random_range(self.min_len..=self.max_len)
    }

    /// A value in `0..=max_value`.
    pub fn value(&mut self) -> i64 {
        self.rng.random_range(0..=self.max_value)
    }

    /// A fresh unordered array of random length.
    pub fn values(&mut self) -> Vec<i64> {
        let len = self.draw_len();
        (0..len).map(|_| self.value()).collect()
    }
}
