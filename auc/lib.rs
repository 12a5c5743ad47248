#![deny(dead_code)]
#![deny(unused_imports)]

//! Single-pass stochastic AUC maximization for linear rankers.
//!
//! The pairwise AUC objective is rewritten as a per-example saddle-point problem
//! over a primal iterate (weights plus two class offsets) and a scalar dual. A
//! multi-stage scheduler runs projected primal-dual steps inside shrinking trust
//! regions and re-tunes its radii and step size from streaming class statistics.

pub mod config;
pub mod data;
pub mod gradient;
pub mod matrix;
pub mod metrics;
pub mod passes;
pub mod projection;
pub mod stage;
pub mod statistics;
pub mod train;
pub mod types;

#[cfg(test)]
pub mod test_fixtures;

pub use config::{ConfigError, OptimizerConfig};
pub use data::{DataError, TrainingSet};
pub use matrix::{FeatureMatrix, FeatureRow, SparseRows};
pub use metrics::{MetricsError, evaluate_auc, roc_auc};
pub use stage::{StagePlan, StageScheduler, StageSummary, TrainingError, TuningState};
pub use train::{TrainedRanker, train_ranker};
pub use types::{Label, PrimalIterate};
