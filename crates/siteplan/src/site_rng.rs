//! Explicit random-number handle for stochastic layout steps.
//!
//! Wraps `ChaCha8Rng` so Voronoi seed sampling is reproducible across
//! platforms. Every function that needs randomness takes `&mut SiteRng`;
//! nothing in the crate reaches for `rand::thread_rng()`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
const DEFAULT_SEED: u64 = 42;

/// Deterministic RNG handle. Use `rng.0` as a `rand::Rng`.
#[derive(Debug, Clone)]
pub struct SiteRng(pub ChaCha8Rng);

impl Default for SiteRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SiteRng {
    /// Create a new `SiteRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Non-reproducible generator seeded from the OS.
    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Seeded when `seed` is present, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed_u64(seed),
            None => Self::from_entropy(),
        }
    }
}
