//! Deterministic input generation shared by every backend.
//!
//! All backends build their native structures from the same value and index
//! sequences, so a given `(seed, kernel, size, nonzeros)` tuple yields
//! numerically identical inputs everywhere. That keeps cross-backend
//! comparisons about the kernels, not about the data.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::kernels::Kernel;

/// SplitMix64 finalizer. Decorrelates seeds derived from small counters.
fn mix_seed(base: u64, counter: u64) -> u64 {
    let mut z = base.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// RNG seeded for one `(kernel, size, nonzeros)` run.
///
/// Streams for different runs are decorrelated even when the base seed and
/// the dimensions are small consecutive integers.
pub fn run_rng(base_seed: u64, kernel: Kernel, size: usize, nonzeros: Option<usize>) -> Xoshiro256PlusPlus {
    let mut seed = mix_seed(base_seed, kernel as u64 + 1);
    seed = mix_seed(seed, size as u64);
    seed = mix_seed(seed, nonzeros.map_or(0, |f| f as u64 + 1));
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// `count` uniform values in `[0, 1)`.
pub fn uniform_values<R: Rng>(rng: &mut R, count: usize) -> Vec<f64> {
    (0..count).map(|_| rng.random()).collect()
}

/// `count` distinct positions in `[0, len)`, ascending.
///
/// This is the index layout of compressed storage: strictly increasing,
/// no duplicates.
///
/// # Panics
///
/// Panics if `count > len`; sweep setup validates dimensions before any
/// generation happens.
pub fn unique_indices<R: Rng>(rng: &mut R, len: usize, count: usize) -> Vec<usize> {
    let mut indices = rand::seq::index::sample(rng, len, count).into_vec();
    indices.sort_unstable();
    indices
}
