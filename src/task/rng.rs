//! Random sources
//!
//! Production draws come from a seeded ChaCha stream so a session can be
//! replayed; tests swap in scripted draws.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform draws used by the trial state machine
pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn next_uniform(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Seeded ChaCha8 stream
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Stream 0 of `seed`
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream of the same seed. Trial ordering uses stream 0,
    /// pop draws use stream 1.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        SeededRandom { rng }
    }

    /// Underlying generator, for shuffles
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
