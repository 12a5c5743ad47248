use ndarray::{Array1, ArrayView1, ArrayViewMut1, s};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Binary class label of a training example.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// Maps a `+1` / `-1` encoded value to a label. Any other value is rejected.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 1.0 {
            Some(Self::Positive)
        } else if value == -1.0 {
            Some(Self::Negative)
        } else {
            None
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// The primal iterate `v` of length `d + 2`.
///
/// Entries `0..d` hold the linear weights. Entry `d` is the offset paired with
/// positive examples and entry `d + 1` the offset paired with negative examples.
#[repr(transparent)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimalIterate(pub Array1<f64>);

impl PrimalIterate {
    pub fn zeros(dim: usize) -> Self {
        Self(Array1::zeros(dim + 2))
    }

    /// Number of feature weights, excluding the two offsets.
    pub fn dim(&self) -> usize {
        self.0.len() - 2
    }

    pub fn weights(&self) -> ArrayView1<'_, f64> {
        let d = self.dim();
        self.0.slice(s![..d])
    }

    pub fn weights_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        let d = self.dim();
        self.0.slice_mut(s![..d])
    }

    pub fn positive_offset(&self) -> f64 {
        self.0[self.dim()]
    }

    pub fn positive_offset_mut(&mut self) -> &mut f64 {
        let d = self.dim();
        &mut self.0[d]
    }

    pub fn negative_offset(&self) -> f64 {
        self.0[self.dim() + 1]
    }

    pub fn negative_offset_mut(&mut self) -> &mut f64 {
        let d = self.dim();
        &mut self.0[d + 1]
    }

    pub fn into_weights(self) -> Array1<f64> {
        let d = self.dim();
        self.0.slice(s![..d]).to_owned()
    }
}

impl Deref for PrimalIterate {
    type Target = Array1<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PrimalIterate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Array1<f64>> for PrimalIterate {
    fn from(values: Array1<f64>) -> Self {
        assert!(
            values.len() >= 2,
            "a primal iterate needs room for both offsets"
        );
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn offsets_live_after_the_weight_block() {
        let mut v = PrimalIterate::from(array![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(v.dim(), 3);
        assert_eq!(v.weights(), array![1.0, 2.0, 3.0]);
        assert_eq!(v.positive_offset(), 4.0);
        assert_eq!(v.negative_offset(), 5.0);

        *v.positive_offset_mut() = -1.0;
        *v.negative_offset_mut() = -2.0;
        v.weights_mut()[0] = 9.0;
        assert_eq!(v.0, array![9.0, 2.0, 3.0, -1.0, -2.0]);
        assert_eq!(v.into_weights(), array![9.0, 2.0, 3.0]);
    }

    #[test]
    fn labels_accept_only_plus_minus_one() {
        assert_eq!(Label::from_value(1.0), Some(Label::Positive));
        assert_eq!(Label::from_value(-1.0), Some(Label::Negative));
        assert_eq!(Label::from_value(0.0), None);
        assert_eq!(Label::from_value(f64::NAN), None);
        assert_eq!(Label::Negative.value(), -1.0);
        assert!(Label::Positive.is_positive());
    }
}
