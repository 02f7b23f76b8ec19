//! RNG module - deck shuffling
//!
//! Wraps a seedable ChaCha generator so decks are reproducible in tests and
//! benchmarks (same seed, same deck) while production sessions seed from the OS.
//!
//! Shuffling is a Fisher-Yates pass (`SliceRandom::shuffle`): every permutation
//! is equally likely. Sorting with a random comparator is biased and is not used.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seedable shuffler owned by a game session
#[derive(Debug, Clone)]
pub struct ShuffleRng {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl ShuffleRng {
    /// Create a deterministic shuffler from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a shuffler seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
            seed: None,
        }
    }

    /// Seed from config when present, OS entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniformly shuffle a slice in place (Fisher-Yates)
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.rng);
    }

    /// The seed this shuffler was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for ShuffleRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
