use ndarray::{Array1, ArrayView1};

use crate::matrix::FeatureRow;
use crate::types::Label;

/// Streaming class statistics over every example seen so far in a run.
///
/// Tracks the positive-class prevalence used by each gradient step and the
/// per-class feature sums from which the class means are refreshed at stage
/// boundaries. Counts are cumulative across stages.
#[derive(Clone, Debug)]
pub struct RunningStatistics {
    seen: usize,
    positives: usize,
    prevalence: f64,
    positive_sum: Array1<f64>,
    negative_sum: Array1<f64>,
    positive_mean: Array1<f64>,
    negative_mean: Array1<f64>,
}

impl RunningStatistics {
    pub fn new(dim: usize) -> Self {
        Self {
            seen: 0,
            positives: 0,
            prevalence: 0.0,
            positive_sum: Array1::zeros(dim),
            negative_sum: Array1::zeros(dim),
            positive_mean: Array1::zeros(dim),
            negative_mean: Array1::zeros(dim),
        }
    }

    /// Records one example and returns the prevalence estimate for its step.
    ///
    /// Both branches divide by the count including the current example. The
    /// positive branch bumps the positive count first; the negative branch
    /// reads it as is.
    pub fn observe(&mut self, row: FeatureRow<'_>, label: Label) -> f64 {
        let denominator = (self.seen + 1) as f64;
        match label {
            Label::Positive => {
                self.positives += 1;
                self.prevalence = self.positives as f64 / denominator;
                row.scaled_add_to(1.0, self.positive_sum.view_mut());
            }
            Label::Negative => {
                self.prevalence = self.positives as f64 / denominator;
                row.scaled_add_to(1.0, self.negative_sum.view_mut());
            }
        }
        self.seen += 1;
        self.prevalence
    }

    /// Refreshes the class means from the running sums. A class that has not
    /// been seen yet keeps its previous mean.
    pub fn finalize(&mut self) -> (ArrayView1<'_, f64>, ArrayView1<'_, f64>) {
        if self.positives > 0 {
            self.positive_mean = &self.positive_sum / self.positives as f64;
        }
        if self.positives < self.seen {
            self.negative_mean = &self.negative_sum / (self.seen - self.positives) as f64;
        }
        (self.positive_mean.view(), self.negative_mean.view())
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn positives(&self) -> usize {
        self.positives
    }

    pub fn prevalence(&self) -> f64 {
        self.prevalence
    }

    pub fn positive_mean(&self) -> ArrayView1<'_, f64> {
        self.positive_mean.view()
    }

    pub fn negative_mean(&self) -> ArrayView1<'_, f64> {
        self.negative_mean.view()
    }
}
