//! # Training Data Container
//!
//! The optimizer consumes a feature matrix and a `+1` / `-1` label vector that
//! the caller has already loaded and normalized. This module only checks that
//! the two agree in shape and that every label is one of the two classes.
//! Feature values themselves are not inspected: non-finite entries flow into
//! the iterate, and the returned model must be validated by the caller.

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

use crate::matrix::{FeatureMatrix, FeatureRow, SparseRows};
use crate::types::Label;

/// A comprehensive error type for training data construction.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("The training set is empty. At least one example is required.")]
    EmptyDataset,
    #[error("The feature matrix has {rows} rows, but {labels} labels were provided.")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("Label at row {row} is {value}; labels must be exactly +1 or -1.")]
    InvalidLabel { row: usize, value: f64 },
    #[error("Sparse matrix has {indices} column indices but {values} values.")]
    SparseLengthMismatch { indices: usize, values: usize },
    #[error(
        "Sparse row pointers must start at 0, be non-decreasing, and end at the number of stored values."
    )]
    SparseRowPointers,
    #[error("Sparse column index {column} is out of range for a matrix with {ncols} columns.")]
    SparseColumnOutOfRange { column: usize, ncols: usize },
}

/// A container for validated examples ready for training or evaluation.
#[derive(Clone, Debug)]
pub struct TrainingSet {
    features: FeatureMatrix,
    labels: Vec<Label>,
}

impl TrainingSet {
    pub fn new(features: FeatureMatrix, labels: ArrayView1<f64>) -> Result<Self, DataError> {
        if features.nrows() != labels.len() {
            return Err(DataError::LengthMismatch {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }
        if labels.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        let labels = labels
            .iter()
            .enumerate()
            .map(|(row, &value)| {
                Label::from_value(value).ok_or(DataError::InvalidLabel { row, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { features, labels })
    }

    pub fn dense(features: Array2<f64>, labels: ArrayView1<f64>) -> Result<Self, DataError> {
        Self::new(FeatureMatrix::Dense(features), labels)
    }

    pub fn sparse(features: SparseRows, labels: ArrayView1<f64>) -> Result<Self, DataError> {
        Self::new(FeatureMatrix::Sparse(features), labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature dimension `d`.
    pub fn dim(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn example(&self, i: usize) -> (FeatureRow<'_>, Label) {
        (self.features.row(i), self.labels[i])
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|l| l.is_positive()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    #[test]
    fn rejects_shape_and_label_problems() {
        let x = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            TrainingSet::dense(x.clone(), array![1.0, -1.0].view()),
            Err(DataError::LengthMismatch { rows: 3, labels: 2 })
        ));
        assert!(matches!(
            TrainingSet::dense(x.clone(), array![1.0, 0.0, -1.0].view()),
            Err(DataError::InvalidLabel { row: 1, .. })
        ));
        assert!(matches!(
            TrainingSet::dense(Array2::zeros((0, 2)), Array1::<f64>::zeros(0).view()),
            Err(DataError::EmptyDataset)
        ));
    }

    #[test]
    fn exposes_examples_in_row_order() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]];
        let data = TrainingSet::dense(x, array![1.0, -1.0, 1.0].view()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.dim(), 2);
        assert_eq!(data.positives(), 2);

        let (row, label) = data.example(1);
        assert_eq!(label, Label::Negative);
        assert_eq!(row.dot(array![3.0, 4.0].view()), 4.0);
    }
}
