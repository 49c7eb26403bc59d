use ndarray::Array2;
use thiserror::Error;

/// Errors that can occur when reshaping a flat vector into a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The point dimensionality was zero.
    #[error("point dimensionality must be non-zero")]
    ZeroDim,

    /// The flat vector length is not a multiple of the point dimensionality.
    #[error("flat vector of length {len} is not divisible by dimensionality {dim}")]
    Indivisible { len: usize, dim: usize },
}

/// A batch of `k` candidate points, each of dimension `d`.
///
/// Callers see the batch as a `k×d` matrix; solver backends see it as a flat
/// vector of length `k·d`. The two representations are related by a fixed
/// row-major bijection: the point index varies slowest, so point `i` occupies
/// `flat[i*d..(i+1)*d]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBatch(Array2<f64>);

impl CandidateBatch {
    /// Wraps a `k×d` matrix of candidate points.
    #[must_use]
    pub fn new(points: Array2<f64>) -> Self {
        Self(points)
    }

    /// Number of points `k` in the batch.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.0.nrows()
    }

    /// Dimensionality `d` of each point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.ncols()
    }

    /// The batch as a `k×d` matrix.
    #[must_use]
    pub fn points(&self) -> &Array2<f64> {
        &self.0
    }

    /// Flattens the batch into the solver-facing vector of length `k·d`.
    #[must_use]
    pub fn flatten(&self) -> Vec<f64> {
        self.0.iter().copied().collect()
    }

    /// Reshapes a flat solver vector back into a `k×d` batch.
    ///
    /// This is the exact inverse of [`flatten`](Self::flatten): for any batch
    /// `b`, `CandidateBatch::from_flat(b.flatten(), b.dim())` reproduces `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dim` is zero or does not divide the vector length.
    pub fn from_flat(flat: Vec<f64>, dim: usize) -> Result<Self, BatchError> {
        if dim == 0 {
            return Err(BatchError::ZeroDim);
        }
        if flat.len() % dim != 0 {
            return Err(BatchError::Indivisible {
                len: flat.len(),
                dim,
            });
        }
        let k = flat.len() / dim;
        let points = Array2::from_shape_vec((k, dim), flat)
            .expect("shape is consistent with vector length");
        Ok(Self(points))
    }
}

impl From<Array2<f64>> for CandidateBatch {
    fn from(points: Array2<f64>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn flatten_is_row_major() {
        let batch = CandidateBatch::new(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(batch.num_points(), 3);
        assert_eq!(batch.dim(), 2);
        assert_eq!(batch.flatten(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn flatten_unflatten_round_trips_exactly() {
        let batch = CandidateBatch::new(array![
            [0.25, -1.5, 3.125],
            [7.0, 0.0, -0.0625],
        ]);
        let rebuilt = CandidateBatch::from_flat(batch.flatten(), batch.dim()).unwrap();
        assert_eq!(rebuilt, batch);
    }

    #[test]
    fn from_flat_rejects_indivisible_length() {
        let err = CandidateBatch::from_flat(vec![1.0, 2.0, 3.0], 2).unwrap_err();
        assert_eq!(err, BatchError::Indivisible { len: 3, dim: 2 });
    }

    #[test]
    fn from_flat_rejects_zero_dim() {
        let err = CandidateBatch::from_flat(vec![1.0], 0).unwrap_err();
        assert_eq!(err, BatchError::ZeroDim);
    }

    #[test]
    fn single_point_batch() {
        let batch = CandidateBatch::from_flat(vec![3.0, 3.0], 2).unwrap();
        assert_eq!(batch.num_points(), 1);
        assert_eq!(batch.points()[[0, 1]], 3.0);
    }
}
