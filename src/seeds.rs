//! Seed management for level generation
//!
//! A single master seed drives everything. Batches of levels derive one
//! sub-seed per level so each level owns an independent random stream and
//! can be generated (or regenerated) on its own.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeds for a run of level generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Piece layout for a single level
    pub layout: u64,
}

impl LevelSeeds {
    /// Create seeds from a master seed, deriving sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            layout: derive_seed(master, "layout"),
        }
    }

    /// Sub-seed for the `index`-th level of a batch.
    pub fn level(&self, index: usize) -> u64 {
        derive_seed(self.master, &format!("level-{}", index))
    }

    /// RNG for a single level.
    pub fn layout_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.layout)
    }

    /// RNG for the `index`-th level of a batch.
    pub fn level_rng(&self, index: usize) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.level(index))
    }
}

impl Default for LevelSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed from a master seed and a stream name.
fn derive_seed(master: u64, stream: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stream.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for LevelSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LevelSeeds {{ master: {}, layout: {} }}", self.master, self.layout)
    }
}
