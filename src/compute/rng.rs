//! Seedable random source for stochastic rules and randomized patterns.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Random source threaded explicitly through every stochastic operation.
pub type SimRng = StdRng;

/// Create a random source from a seed.
pub fn sim_rng(seed: u64) -> SimRng {
    StdRng::seed_from_u64(seed)
}

/// Per-row stream derived from a step seed.
///
/// Rows are updated independently (possibly in parallel), so each draws from
/// its own stream; the result depends only on `step_seed` and `row`.
#[inline]
pub(crate) fn row_rng(step_seed: u64, row: usize) -> SimRng {
    const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;
    StdRng::seed_from_u64(step_seed ^ (row as u64).wrapping_add(1).wrapping_mul(GOLDEN))
}
