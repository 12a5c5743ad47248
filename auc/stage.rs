// auc/stage.rs

//! # Multi-Stage Scheduling
//!
//! The optimizer runs a fixed number of stages, each consuming an equal block of
//! the index sequence. Within a stage every step is a projected primal-dual
//! update confined to a trust region around the stage checkpoint `(v1, alpha1)`.
//! Between stages:
//!
//! 1.  The primal trust radius `r` is halved.
//! 2.  The dual trust radius `D` and the confidence parameter are recomputed from
//!     closed-form bounds at confidence level `delta = 0.1`, using the prevalence
//!     estimate and the stage length. A bound whose denominator is not positive
//!     is vacuous and is replaced by a large sentinel.
//! 3.  The step size is rescaled by the change in confidence and never grows.
//! 4.  The class means are refreshed, the checkpoint moves to the stage's
//!     averaged iterate, and the dual checkpoint is reset to
//!     `(m_neg - m_pos) . w1`.
//!
//! After the last stage the weight block of the checkpoint is the model.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, OptimizerConfig};
use crate::data::TrainingSet;
use crate::gradient::gradient_step;
use crate::projection::{distance, project_ball, project_box, project_l1_in_place};
use crate::statistics::RunningStatistics;
use crate::types::PrimalIterate;

/// Confidence level of the per-stage statistical bounds.
pub const CONFIDENCE_DELTA: f64 = 0.1;

/// Stand-in for a bound whose denominator is not positive.
pub const VACUOUS_BOUND: f64 = 1e7;

/// Confidence parameter before the first stage boundary.
pub const INITIAL_CONFIDENCE: f64 = 9.0;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Invalid optimizer configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "An index sequence of length {n_ids} is too short to schedule a single stage. Supply more passes."
    )]
    SequenceTooShort { n_ids: usize },

    #[error(
        "Index sequence entry {position} refers to example {index}, but the training set has {n_examples} examples."
    )]
    IndexOutOfRange {
        position: usize,
        index: usize,
        n_examples: usize,
    },
}

/// How an index sequence is split into stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    /// Number of stages `m`.
    pub stages: usize,
    /// Steps per stage `n0`.
    pub stage_len: usize,
}

impl StagePlan {
    /// `m = floor(0.5 * log2(2 n / log2 n)) - 1` stages of `n0 = floor(n / m)` steps.
    pub fn for_sequence_len(n_ids: usize) -> Result<Self, TrainingError> {
        if n_ids < 2 {
            return Err(TrainingError::SequenceTooShort { n_ids });
        }
        let n = n_ids as f64;
        let stages = (0.5 * (2.0 * n / n.log2()).log2()).floor() - 1.0;
        if stages < 1.0 {
            return Err(TrainingError::SequenceTooShort { n_ids });
        }
        let stages = stages as usize;
        Ok(Self {
            stages,
            stage_len: n_ids / stages,
        })
    }

    pub fn total_steps(&self) -> usize {
        self.stages * self.stage_len
    }
}

/// Radii, confidence and step size in force during one stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningState {
    /// Euclidean trust radius `r` around the primal checkpoint.
    pub trust_radius: f64,
    /// Trust radius `D` around the dual checkpoint.
    pub dual_radius: f64,
    /// Internal confidence parameter (not the L1 radius).
    pub confidence: f64,
    /// Step size `eta`.
    pub step_size: f64,
}

impl TuningState {
    pub fn initial(l1_radius: f64, step_size: f64) -> Self {
        let trust_radius = 2.0 * 3f64.sqrt() * l1_radius;
        Self {
            trust_radius,
            dual_radius: 2.0 * 2f64.sqrt() * trust_radius,
            confidence: INITIAL_CONFIDENCE,
            step_size,
        }
    }

    /// Tuning for the next stage, given the prevalence at the end of this one.
    pub fn next(&self, prevalence: f64, l1_radius: f64, stage_len: usize) -> Self {
        let trust_radius = self.trust_radius / 2.0;
        let dual_radius = dual_radius_bound(prevalence, trust_radius, l1_radius, stage_len);
        let confidence = confidence_bound(prevalence, stage_len);
        Self {
            trust_radius,
            dual_radius,
            confidence,
            step_size: next_step_size(self.step_size, self.confidence, confidence),
        }
    }
}

fn log_term() -> f64 {
    (12.0 / CONFIDENCE_DELTA).ln()
}

/// Dual trust radius for the next stage. `trust_radius` is the already halved `r`.
pub fn dual_radius_bound(prevalence: f64, trust_radius: f64, l1_radius: f64, stage_len: usize) -> f64 {
    let l = log_term();
    let n0 = stage_len as f64;
    let numerator = 12.0 * 2f64.sqrt() * (2.0 + (2.0 * l).sqrt()) * l1_radius;
    let denominator = prevalence.min(1.0 - prevalence) * n0 - (2.0 * n0 * l).sqrt();
    if denominator > 0.0 {
        2.0 * 2f64.sqrt() * trust_radius + numerator / denominator.sqrt()
    } else {
        VACUOUS_BOUND
    }
}

/// Confidence parameter for the next stage.
pub fn confidence_bound(prevalence: f64, stage_len: usize) -> f64 {
    let l = log_term();
    let numerator = 288.0 * (2.0 + (2.0 * l).sqrt()).powi(2);
    let denominator = prevalence.min(1.0 - prevalence) - (2.0 * l / stage_len as f64).sqrt();
    if denominator > 0.0 {
        INITIAL_CONFIDENCE + numerator / denominator
    } else {
        VACUOUS_BOUND
    }
}

/// `min(sqrt(new / old) * eta / 2, eta)`.
pub fn next_step_size(step_size: f64, confidence: f64, next_confidence: f64) -> f64 {
    ((next_confidence / confidence).sqrt() * step_size / 2.0).min(step_size)
}

/// Start-of-stage iterate and dual.
#[derive(Clone, Debug, PartialEq)]
pub struct StageCheckpoint {
    pub iterate: PrimalIterate,
    pub dual: f64,
}

/// Diagnostics of a completed stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub index: usize,
    pub steps: usize,
    /// Prevalence estimate at the end of the stage.
    pub prevalence: f64,
    /// Tuning the stage ran with.
    pub tuning: TuningState,
    /// Tuning handed to the following stage.
    pub next_tuning: TuningState,
    /// Dual checkpoint for the following stage.
    pub dual_reset: f64,
    /// Largest `||v - v1||_2` after projection over the stage.
    pub max_primal_excursion: f64,
    /// Largest `|alpha - alpha1|` after projection over the stage.
    pub max_dual_excursion: f64,
}

/// Drives one optimizer run over a training set.
pub struct StageScheduler<'a> {
    data: &'a TrainingSet,
    ids: &'a [usize],
    l1_radius: f64,
    plan: StagePlan,
    tuning: TuningState,
    checkpoint: StageCheckpoint,
    stats: RunningStatistics,
    cursor: usize,
    completed: usize,
}

impl<'a> StageScheduler<'a> {
    pub fn new(data: &'a TrainingSet, config: &'a OptimizerConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        let plan = StagePlan::for_sequence_len(config.ids.len())?;
        let ids = &config.ids[..plan.total_steps()];
        if let Some((position, &index)) = ids.iter().enumerate().find(|&(_, &i)| i >= data.len()) {
            return Err(TrainingError::IndexOutOfRange {
                position,
                index,
                n_examples: data.len(),
            });
        }

        let dim = data.dim();
        Ok(Self {
            data,
            ids,
            l1_radius: config.l1_radius,
            plan,
            tuning: TuningState::initial(config.l1_radius, config.eta),
            checkpoint: StageCheckpoint {
                iterate: PrimalIterate::zeros(dim),
                dual: 0.0,
            },
            stats: RunningStatistics::new(dim),
            cursor: 0,
            completed: 0,
        })
    }

    pub fn plan(&self) -> StagePlan {
        self.plan
    }

    pub fn tuning(&self) -> &TuningState {
        &self.tuning
    }

    pub fn checkpoint(&self) -> &StageCheckpoint {
        &self.checkpoint
    }

    pub fn statistics(&self) -> &RunningStatistics {
        &self.stats
    }

    /// Number of index-sequence entries consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.plan.stages
    }

    /// Runs the next stage and moves the checkpoint. Returns `None` once all
    /// stages have run.
    pub fn run_stage(&mut self) -> Option<StageSummary> {
        if self.is_finished() {
            return None;
        }
        let n0 = self.plan.stage_len;
        let r = self.l1_radius;
        let tuning = self.tuning;
        let center = &self.checkpoint;

        let mut v = center.iterate.clone();
        let mut alpha = center.dual;
        let mut sum = Array1::<f64>::zeros(v.len());
        let mut max_primal_excursion = 0.0f64;
        let mut max_dual_excursion = 0.0f64;

        for &id in &self.ids[self.cursor..self.cursor + n0] {
            let (row, label) = self.data.example(id);
            let prevalence = self.stats.observe(row, label);
            gradient_step(&mut v, &mut alpha, row, label, prevalence, tuning.step_size);

            project_l1_in_place(v.weights_mut(), r);
            let a = project_box(v.positive_offset(), r);
            *v.positive_offset_mut() = a;
            let b = project_box(v.negative_offset(), r);
            *v.negative_offset_mut() = b;
            alpha = project_box(alpha, 2.0 * r);
            project_ball(v.view_mut(), center.iterate.view(), tuning.trust_radius);
            alpha = center.dual + project_box(alpha - center.dual, tuning.dual_radius);

            max_primal_excursion = max_primal_excursion.max(distance(v.view(), center.iterate.view()));
            max_dual_excursion = max_dual_excursion.max((alpha - center.dual).abs());
            sum += &*v;
        }
        self.cursor += n0;

        let average = PrimalIterate::from(sum / n0 as f64);
        let prevalence = self.stats.prevalence();
        let next_tuning = tuning.next(prevalence, r, n0);
        if next_tuning.dual_radius == VACUOUS_BOUND || next_tuning.confidence == VACUOUS_BOUND {
            log::warn!(
                "Stage {}: class separation bound is vacuous (prevalence {:.4}, {} steps); using sentinel {:.0e}",
                self.completed,
                prevalence,
                n0,
                VACUOUS_BOUND
            );
        }

        let (positive_mean, negative_mean) = self.stats.finalize();
        let dual_reset = (&negative_mean - &positive_mean).dot(&average.weights());

        let summary = StageSummary {
            index: self.completed,
            steps: n0,
            prevalence,
            tuning,
            next_tuning,
            dual_reset,
            max_primal_excursion,
            max_dual_excursion,
        };
        log::debug!(
            "Stage {} done: p_hat={:.4}, r={:.4e}, D={:.4e}, confidence={:.4e}, eta={:.4e}, alpha1={:.4e}",
            summary.index,
            prevalence,
            next_tuning.trust_radius,
            next_tuning.dual_radius,
            next_tuning.confidence,
            next_tuning.step_size,
            dual_reset
        );

        self.tuning = next_tuning;
        self.checkpoint = StageCheckpoint {
            iterate: average,
            dual: dual_reset,
        };
        self.completed += 1;
        Some(summary)
    }

    /// Runs all remaining stages and returns their summaries with the final weights.
    pub fn run(mut self) -> (Array1<f64>, Vec<StageSummary>) {
        let mut summaries = Vec::with_capacity(self.plan.stages);
        while let Some(summary) = self.run_stage() {
            summaries.push(summary);
        }
        (self.checkpoint.iterate.into_weights(), summaries)
    }
}
