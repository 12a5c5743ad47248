//! Synthetic data builders shared by the unit tests.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::TrainingSet;

/// Two bounded clusters in the plane: positives around `(0.6, 0.8)`, negatives
/// around `(-0.6, -0.8)`, each coordinate jittered uniformly by `noise`.
pub struct SeparableClusters {
    n_samples: usize,
    prevalence: f64,
    noise: f64,
    seed: u64,
}

impl SeparableClusters {
    pub fn new(n_samples: usize) -> Self {
        Self {
            n_samples,
            prevalence: 0.5,
            noise: 0.1,
            seed: 42,
        }
    }

    pub fn with_prevalence(mut self, prevalence: f64) -> Self {
        self.prevalence = prevalence;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The first `round(n_samples * prevalence)` rows are positive, clamped so
    /// that both classes are present whenever `n_samples >= 2`.
    pub fn build(&self) -> TrainingSet {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n_pos = ((self.n_samples as f64 * self.prevalence).round() as usize)
            .clamp(1, self.n_samples.saturating_sub(1).max(1));

        let mut x = Array2::zeros((self.n_samples, 2));
        let mut y = Array1::from_elem(self.n_samples, -1.0);
        for i in 0..self.n_samples {
            let sign = if i < n_pos { 1.0 } else { -1.0 };
            y[i] = sign;
            x[[i, 0]] = sign * 0.6 + rng.gen_range(-self.noise..=self.noise);
            x[[i, 1]] = sign * 0.8 + rng.gen_range(-self.noise..=self.noise);
        }
        TrainingSet::dense(x, y.view()).expect("synthetic clusters are well formed")
    }
}
