// auc/train.rs

//! # Model Training
//!
//! Entry point that validates the configuration against the training set, runs
//! every stage of the scheduler, and packages the final averaged weights with
//! the per-stage diagnostics.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::OptimizerConfig;
use crate::data::TrainingSet;
use crate::matrix::FeatureMatrix;
use crate::metrics::MetricsError;
use crate::stage::{StagePlan, StageScheduler, StageSummary, TrainingError};

/// A trained linear ranker: score(x) = w . x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedRanker {
    pub weights: Array1<f64>,
    pub plan: StagePlan,
    pub stages: Vec<StageSummary>,
}

impl TrainedRanker {
    /// False when any weight is NaN or infinite. Such a model must not be used
    /// to score examples.
    pub fn is_finite(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite())
    }

    /// Ranking scores for every row of `features`.
    pub fn score(&self, features: &FeatureMatrix) -> Result<Array1<f64>, MetricsError> {
        if features.ncols() != self.weights.len() {
            return Err(MetricsError::DimensionMismatch {
                model: self.weights.len(),
                features: features.ncols(),
            });
        }
        if !self.is_finite() {
            return Err(MetricsError::NonFiniteWeights);
        }
        Ok(features.dot(self.weights.view()))
    }
}

/// Trains a ranker on `data` by following `config.ids` through every stage.
pub fn train_ranker(
    data: &TrainingSet,
    config: &OptimizerConfig,
) -> Result<TrainedRanker, TrainingError> {
    let scheduler = StageScheduler::new(data, config)?;
    let plan = scheduler.plan();
    log::info!(
        "Starting AUC training: {} examples, {} features, {} indices, {} stages of {} steps.",
        data.len(),
        data.dim(),
        config.ids.len(),
        plan.stages,
        plan.stage_len
    );
    if config.n_pass * data.len() != config.ids.len() {
        log::warn!(
            "n_pass = {} does not match {} indices over {} examples",
            config.n_pass,
            config.ids.len(),
            data.len()
        );
    }

    let (weights, stages) = scheduler.run();
    log::info!(
        "AUC training finished after {} steps; weight L1 norm {:.6}",
        plan.total_steps(),
        weights.iter().map(|w| w.abs()).sum::<f64>()
    );

    Ok(TrainedRanker {
        weights,
        plan,
        stages,
    })
}
