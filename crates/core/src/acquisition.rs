use std::error::Error as StdError;

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors that can occur when evaluating an acquisition function.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The underlying model failed to evaluate at the requested point.
    #[error("acquisition evaluation failed")]
    Evaluation(#[source] Box<dyn StdError + Send + Sync>),

    /// The acquisition returned a zero-length value container.
    #[error("acquisition returned an empty value")]
    EmptyValue,

    /// A Hessian was requested from an acquisition that does not provide one.
    #[error("this acquisition does not provide a Hessian")]
    HessianUnavailable,
}

/// An acquisition function defined over a flattened batch of candidate points.
///
/// Implementations are supplied by the modeling layer and treated as
/// read-only by the optimizer: solvers may evaluate an acquisition any number
/// of times per run and must receive consistent results for repeated
/// identical inputs.
///
/// The flat point passed to [`value_grad`] and [`hessian`] has length `k·d`,
/// where `k` is the batch size and `d` is [`dim`]. The value is returned as a
/// (typically length-1) array because modeling layers commonly produce
/// singleton containers rather than bare scalars; the optimizer normalizes it.
///
/// [`value_grad`]: Acquisition::value_grad
/// [`hessian`]: Acquisition::hessian
/// [`dim`]: Acquisition::dim
pub trait Acquisition {
    /// Dimensionality `d` of a single candidate point.
    fn dim(&self) -> usize;

    /// Evaluates the acquisition value and gradient at a flat point.
    ///
    /// The gradient must have the same length as `x`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Evaluation`] if the underlying model fails.
    fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError>;

    /// Evaluates the dense symmetric Hessian at a flat point.
    ///
    /// Only required when a Hessian-capable backend is selected. The returned
    /// matrix must be `n×n` for a flat point of length `n`.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`EvalError::HessianUnavailable`].
    fn hessian(&self, x: &[f64]) -> Result<Array2<f64>, EvalError> {
        let _ = x;
        Err(EvalError::HessianUnavailable)
    }
}

impl<A: Acquisition + ?Sized> Acquisition for &A {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
        (**self).value_grad(x)
    }

    fn hessian(&self, x: &[f64]) -> Result<Array2<f64>, EvalError> {
        (**self).hessian(x)
    }
}
