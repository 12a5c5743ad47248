use ndarray::ArrayView1;
use thiserror::Error;

use crate::data::TrainingSet;
use crate::train::TrainedRanker;
use crate::types::Label;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Got {scores} scores for {labels} labels.")]
    LengthMismatch { scores: usize, labels: usize },
    #[error("AUC is undefined without at least one positive and one negative example.")]
    MissingClass,
    #[error("Score at position {0} is not finite.")]
    NonFiniteScore(usize),
    #[error("Model weights contain NaN or infinite values.")]
    NonFiniteWeights,
    #[error("Model has {model} weights but the features have {features} columns.")]
    DimensionMismatch { model: usize, features: usize },
}

/// Area under the ROC curve via the Mann-Whitney statistic. Tied scores
/// receive their average rank, so a positive tied with a negative counts 1/2.
pub fn roc_auc(scores: ArrayView1<f64>, labels: &[Label]) -> Result<f64, MetricsError> {
    if scores.len() != labels.len() {
        return Err(MetricsError::LengthMismatch {
            scores: scores.len(),
            labels: labels.len(),
        });
    }
    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        return Err(MetricsError::NonFiniteScore(i));
    }
    let positives = labels.iter().filter(|l| l.is_positive()).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(MetricsError::MissingClass);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks start..end (1-based start+1..=end) share their mean
        let mean_rank = (start + end + 1) as f64 / 2.0;
        let tied_positives = order[start..end]
            .iter()
            .filter(|&&i| labels[i].is_positive())
            .count();
        positive_rank_sum += mean_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Ok((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// Held-out AUC of `ranker` on `data`, reporting a failed run as 0.0.
///
/// A model with non-finite weights is never used to score examples.
pub fn evaluate_auc(ranker: &TrainedRanker, data: &TrainingSet) -> f64 {
    let scores = match ranker.score(data.features()) {
        Ok(scores) => scores,
        Err(e) => {
            log::warn!("Treating run as failed: {e}");
            return 0.0;
        }
    };
    match roc_auc(scores.view(), data.labels()) {
        Ok(auc) => auc,
        Err(e) => {
            log::warn!("AUC could not be computed: {e}");
            0.0
        }
    }
}
