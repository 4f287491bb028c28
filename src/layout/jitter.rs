//! Cosmetic horizontal jitter for wrapped sub-rows.
//!
//! Jitter only breaks up rigid grids. Everything downstream (edges,
//! hit-testing, export) reads the final jittered rectangles, so the source of
//! randomness is injectable: tests pass a seed, the browser uses entropy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait JitterSource {
    /// An offset in `-amplitude..=amplitude`. Zero when `amplitude <= 0`.
    fn offset(&mut self, amplitude: i32) -> i32;
}

/// Always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&mut self, _amplitude: i32) -> i32 {
        0
    }
}

#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl JitterSource for SeededJitter {
    fn offset(&mut self, amplitude: i32) -> i32 {
        if amplitude <= 0 {
            return 0;
        }
        self.rng.gen_range(-amplitude..=amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = SeededJitter::new(42);
        let mut b = SeededJitter::new(42);
        let xs: Vec<i32> = (0..16).map(|_| a.offset(30)).collect();
        let ys: Vec<i32> = (0..16).map(|_| b.offset(30)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| x.abs() <= 30));
    }

    #[test]
    fn test_zero_amplitude() {
        assert_eq!(SeededJitter::new(1).offset(0), 0);
        assert_eq!(NoJitter.offset(30), 0);
    }
}
