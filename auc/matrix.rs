use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1, Axis};

use crate::data::DataError;

/// Compressed sparse row storage for feature matrices with few non-zeros per row.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseRows {
    ncols: usize,
    row_ptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseRows {
    /// Builds a CSR matrix. `row_ptr` has one entry per row plus a trailing end
    /// offset; row `i` owns `indices[row_ptr[i]..row_ptr[i + 1]]`.
    pub fn new(
        ncols: usize,
        row_ptr: Vec<usize>,
        indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self, DataError> {
        if indices.len() != values.len() {
            return Err(DataError::SparseLengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if row_ptr.first() != Some(&0) || row_ptr.last() != Some(&indices.len()) {
            return Err(DataError::SparseRowPointers);
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(DataError::SparseRowPointers);
        }
        if let Some(&col) = indices.iter().find(|&&col| col >= ncols) {
            return Err(DataError::SparseColumnOutOfRange { column: col, ncols });
        }
        Ok(Self {
            ncols,
            row_ptr,
            indices,
            values,
        })
    }

    /// Keeps only the non-zero entries of a dense matrix.
    pub fn from_dense(dense: &Array2<f64>) -> Self {
        let mut row_ptr = Vec::with_capacity(dense.nrows() + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for row in dense.axis_iter(Axis(0)) {
            for (col, &value) in row.iter().enumerate() {
                if value != 0.0 {
                    indices.push(col);
                    values.push(value);
                }
            }
            row_ptr.push(indices.len());
        }
        Self {
            ncols: dense.ncols(),
            row_ptr,
            indices,
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row(&self, i: usize) -> FeatureRow<'_> {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        FeatureRow::Sparse {
            indices: &self.indices[range.clone()],
            values: &self.values[range],
        }
    }
}

/// Feature matrix backing a training set, one example per row.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureMatrix {
    Dense(Array2<f64>),
    Sparse(SparseRows),
}

impl FeatureMatrix {
    pub fn nrows(&self) -> usize {
        match self {
            Self::Dense(matrix) => matrix.nrows(),
            Self::Sparse(matrix) => matrix.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Self::Dense(matrix) => matrix.ncols(),
            Self::Sparse(matrix) => matrix.ncols(),
        }
    }

    pub fn row(&self, i: usize) -> FeatureRow<'_> {
        match self {
            Self::Dense(matrix) => FeatureRow::Dense(matrix.row(i)),
            Self::Sparse(matrix) => matrix.row(i),
        }
    }

    /// Linear scores `X w` for every row.
    pub fn dot(&self, weights: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Self::Dense(matrix) => matrix.dot(&weights),
            Self::Sparse(matrix) => {
                Array1::from_shape_fn(matrix.nrows(), |i| matrix.row(i).dot(weights))
            }
        }
    }
}

impl From<Array2<f64>> for FeatureMatrix {
    fn from(matrix: Array2<f64>) -> Self {
        Self::Dense(matrix)
    }
}

impl From<SparseRows> for FeatureMatrix {
    fn from(matrix: SparseRows) -> Self {
        Self::Sparse(matrix)
    }
}

/// Borrowed view of a single example's features.
#[derive(Clone, Copy, Debug)]
pub enum FeatureRow<'a> {
    Dense(ArrayView1<'a, f64>),
    Sparse {
        indices: &'a [usize],
        values: &'a [f64],
    },
}

impl FeatureRow<'_> {
    pub fn dot(&self, weights: ArrayView1<f64>) -> f64 {
        match self {
            Self::Dense(row) => row.dot(&weights),
            Self::Sparse { indices, values } => indices
                .iter()
                .zip(values.iter())
                .map(|(&col, &value)| value * weights[col])
                .sum(),
        }
    }

    /// `out += scale * x`, touching only the non-zeros of a sparse row.
    pub fn scaled_add_to(&self, scale: f64, mut out: ArrayViewMut1<f64>) {
        match self {
            Self::Dense(row) => out.scaled_add(scale, row),
            Self::Sparse { indices, values } => {
                for (&col, &value) in indices.iter().zip(values.iter()) {
                    out[col] += scale * value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn dense() -> Array2<f64> {
        array![[0.0, 2.0, 0.0], [1.0, 0.0, -3.0], [0.0, 0.0, 0.0]]
    }

    #[test]
    fn sparse_and_dense_rows_agree() {
        let d = FeatureMatrix::Dense(dense());
        let s = FeatureMatrix::Sparse(SparseRows::from_dense(&dense()));
        let w = array![0.5, -1.0, 2.0];

        assert_eq!(s.nrows(), 3);
        assert_eq!(s.ncols(), 3);
        for i in 0..3 {
            assert_abs_diff_eq!(d.row(i).dot(w.view()), s.row(i).dot(w.view()), epsilon = 1e-12);

            let mut a = Array1::zeros(3);
            let mut b = Array1::zeros(3);
            d.row(i).scaled_add_to(-2.0, a.view_mut());
            s.row(i).scaled_add_to(-2.0, b.view_mut());
            assert_eq!(a, b);
        }
        assert_eq!(d.dot(w.view()), s.dot(w.view()));
        assert_eq!(d.dot(w.view()), array![-2.0, -5.5, 0.0]);
    }

    #[test]
    fn from_dense_skips_zeros() {
        let s = SparseRows::from_dense(&dense());
        assert_eq!(s.nnz(), 3);
        assert_eq!(s.row_ptr, vec![0, 1, 3, 3]);
    }

    #[test]
    fn malformed_csr_is_rejected() {
        assert!(matches!(
            SparseRows::new(2, vec![0, 1], vec![0, 1], vec![1.0]),
            Err(DataError::SparseLengthMismatch { .. })
        ));
        assert!(matches!(
            SparseRows::new(2, vec![0, 2, 1], vec![0], vec![1.0]),
            Err(DataError::SparseRowPointers)
        ));
        assert!(matches!(
            SparseRows::new(2, vec![1, 1], vec![0], vec![1.0]),
            Err(DataError::SparseRowPointers)
        ));
        assert!(matches!(
            SparseRows::new(2, vec![0, 1], vec![5], vec![1.0]),
            Err(DataError::SparseColumnOutOfRange { column: 5, ncols: 2 })
        ));
        assert!(SparseRows::new(2, vec![0, 1, 1], vec![1], vec![3.0]).is_ok());
    }
}
