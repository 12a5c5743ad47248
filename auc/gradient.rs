//! Per-example sub-gradient of the AUC saddle-point surrogate.
//!
//! With `s = w . x`, prevalence `p`, dual `a` and the offset `b` paired with the
//! example's class:
//!
//! | label | weights                   | offset          | dual                    |
//! |-------|---------------------------|-----------------|-------------------------|
//! | +1    | `(1 - p)(s - b - 1 - a) x` | `(p - 1)(s - b)` | `(p - 1)(s + p a)`       |
//! | -1    | `p (s - b + 1 + a) x`      | `p (b - s)`      | `p (s + (p - 1) a)`      |
//!
//! The offset of the other class has a zero gradient. The primal descends and
//! the dual ascends; projection is left to the caller.

use crate::matrix::FeatureRow;
use crate::types::{Label, PrimalIterate};

/// Gradient of one example. The weight part is always a multiple of the
/// example's features, so only the multiplier is stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaddleGradient {
    pub weight_scale: f64,
    pub positive_offset: f64,
    pub negative_offset: f64,
    pub dual: f64,
}

impl SaddleGradient {
    pub fn compute(
        iterate: &PrimalIterate,
        dual: f64,
        row: FeatureRow<'_>,
        label: Label,
        prevalence: f64,
    ) -> Self {
        let p = prevalence;
        let score = row.dot(iterate.weights());
        match label {
            Label::Positive => {
                let b = iterate.positive_offset();
                Self {
                    weight_scale: (1.0 - p) * (score - b - 1.0 - dual),
                    positive_offset: (p - 1.0) * (score - b),
                    negative_offset: 0.0,
                    dual: (p - 1.0) * (score + p * dual),
                }
            }
            Label::Negative => {
                let b = iterate.negative_offset();
                Self {
                    weight_scale: p * (score - b + 1.0 + dual),
                    positive_offset: 0.0,
                    negative_offset: p * (b - score),
                    dual: p * (score + (p - 1.0) * dual),
                }
            }
        }
    }

    /// `v <- v - eta * grad_v`, `alpha <- alpha + eta * grad_alpha`.
    pub fn apply(&self, iterate: &mut PrimalIterate, dual: &mut f64, row: FeatureRow<'_>, eta: f64) {
        row.scaled_add_to(-eta * self.weight_scale, iterate.weights_mut());
        *iterate.positive_offset_mut() -= eta * self.positive_offset;
        *iterate.negative_offset_mut() -= eta * self.negative_offset;
        *dual += eta * self.dual;
    }
}

/// One unprojected primal-descent / dual-ascent step on a single example.
pub fn gradient_step(
    iterate: &mut PrimalIterate,
    dual: &mut f64,
    row: FeatureRow<'_>,
    label: Label,
    prevalence: f64,
    eta: f64,
) -> SaddleGradient {
    let grad = SaddleGradient::compute(iterate, *dual, row, label, prevalence);
    grad.apply(iterate, dual, row, eta);
    grad
}
