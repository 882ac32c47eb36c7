//! Seeded randomness for tile spawns and MCTS rollouts.
//!
//! Two pieces:
//!
//! - `RandomSource`: the two questions the game ever asks of randomness
//!   ("which empty cell?" and "is this spawn a 2?"). Grid operations are
//!   generic over it so tests can script exact placements.
//! - `GameRng`: the ChaCha8-backed implementation used by agents and search.
//!
//! ```
//! use rust_2048::core::{GameRng, Grid};
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(Grid::new(4, 4, &mut a).unwrap(), Grid::new(4, 4, &mut b).unwrap());
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of randomness consumed by tile insertion and MCTS.
///
/// Implementations must return an index strictly below `len`; callers never
/// pass `len == 0`.
pub trait RandomSource {
    /// Pick an index uniformly in `0..len`.
    fn index(&mut self, len: usize) -> usize;

    /// Return `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

/// ChaCha8 generator that remembers its seed.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    forks: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            forks: 0,
        }
    }

    /// Derive an independent generator; the n-th fork of a given seed is
    /// always the same.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.forks += 1;
        Self::new(self.seed ^ self.forks.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability)
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Snapshot the stream position.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            forks: self.forks,
        }
    }

    /// Resume a stream captured by `state`.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.inner.set_word_pos(state.word_pos);
        rng.forks = state.forks;
        rng
    }
}

impl RandomSource for GameRng {
    fn index(&mut self, len: usize) -> usize {
        self.gen_range_usize(0..len)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.gen_bool(probability)
    }
}

/// Serializable position of a `GameRng` stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
    pub forks: u64,
}
