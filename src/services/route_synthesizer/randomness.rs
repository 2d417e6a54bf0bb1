use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the synthesizer's random choices: loop orientation, one-way
/// bearings and POI picks. Seeded sources make a whole search replayable.
pub trait RandomSource: Send {
    /// Uniform sample in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform bearing in `[0, 360)` degrees
    fn bearing(&mut self) -> f64 {
        self.unit() * 360.0
    }

    /// Uniform index into a collection of `len` items. `len` must be > 0.
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f64).floor() as usize).min(len.saturating_sub(1))
    }
}

impl RandomSource for StdRng {
    fn unit(&mut self) -> f64 {
        StandardUniform.sample(self)
    }
}

/// Seeded generator, falling back to the clock when no seed is configured
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });
    StdRng::seed_from_u64(seed)
}
