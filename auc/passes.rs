//! Index sequences that drive the optimizer through the training set.
//!
//! A sequence is the concatenation of `n_pass` passes over `[0, n)`. The
//! optimizer reads it strictly in order, so all randomness lives here and is
//! fixed by the seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// `n_pass` independently shuffled permutations of `[0, n_examples)`, back to back.
pub fn shuffled_passes(n_examples: usize, n_pass: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ids = Vec::with_capacity(n_examples * n_pass);
    let mut order: Vec<usize> = (0..n_examples).collect();
    for _ in 0..n_pass {
        order.shuffle(&mut rng);
        ids.extend_from_slice(&order);
    }
    ids
}

/// `n_pass` copies of the identity order.
pub fn sequential_passes(n_examples: usize, n_pass: usize) -> Vec<usize> {
    (0..n_pass).flat_map(|_| 0..n_examples).collect()
}
