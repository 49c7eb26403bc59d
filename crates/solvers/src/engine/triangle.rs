//! Upper-triangle enumeration for symmetric Hessian storage.
//!
//! The engine receives the Hessian's sparsity pattern as parallel row/column
//! index lists at problem initialization, and later receives values as a flat
//! buffer that must follow the same element order. Both sides go through
//! [`upper_indices`], so the pattern and the fill order cannot drift apart.

use ndarray::Array2;

/// Enumerates the on-and-above-diagonal indices of an `n×n` matrix.
///
/// Row-major: `row` ascends in the outer loop, `col` ascends from `row` in
/// the inner loop, so `row ≤ col` for every yielded pair.
pub(crate) fn upper_indices(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |row| (row..n).map(move |col| (row, col)))
}

/// Number of entries in the upper triangle of an `n×n` matrix.
pub(crate) fn len(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Writes the upper triangle of `matrix` into `out` in enumeration order.
pub(crate) fn pack_upper(matrix: &Array2<f64>, out: &mut [f64]) {
    debug_assert_eq!(out.len(), len(matrix.nrows()));
    for (slot, (row, col)) in out.iter_mut().zip(upper_indices(matrix.nrows())) {
        *slot = matrix[[row, col]];
    }
}
