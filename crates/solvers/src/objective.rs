//! Adapter between the acquisition contract and what backends expect.
//!
//! Backends want a plain scalar value plus a gradient slice at an arbitrary
//! flat point, and (for second-order backends) a dense Hessian. The modeling
//! layer returns values in singleton containers and may be expensive to call,
//! so this adapter normalizes the value and memoizes the last evaluation —
//! callback-driven engines commonly request the same point several times in a
//! row for different quantities.

use std::cell::RefCell;

use ndarray::Array2;

use batchopt_core::{Acquisition, EvalError};

struct ValueCache {
    x: Vec<f64>,
    value: f64,
    gradient: Vec<f64>,
}

struct HessianCache {
    x: Vec<f64>,
    hessian: Array2<f64>,
}

/// Wraps an [`Acquisition`] for repeated backend evaluation.
///
/// Read-only from the backend's point of view: the only interior state is the
/// memo of the last evaluated point, so repeated identical inputs yield
/// identical results without re-invoking the acquisition.
pub struct ObjectiveFn<'a, A: Acquisition + ?Sized> {
    acquisition: &'a A,
    value_cache: RefCell<Option<ValueCache>>,
    hessian_cache: RefCell<Option<HessianCache>>,
}

impl<'a, A: Acquisition + ?Sized> ObjectiveFn<'a, A> {
    /// Creates an adapter over the given acquisition.
    #[must_use]
    pub fn new(acquisition: &'a A) -> Self {
        Self {
            acquisition,
            value_cache: RefCell::new(None),
            hessian_cache: RefCell::new(None),
        }
    }

    /// Dimensionality `d` of a single candidate point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.acquisition.dim()
    }

    /// Evaluates value and gradient at a flat point in one combined call.
    ///
    /// The value is normalized to a plain scalar even when the acquisition
    /// returns a length-1 container.
    ///
    /// # Errors
    ///
    /// Propagates the acquisition's evaluation error; returns
    /// [`EvalError::EmptyValue`] if the value container is empty.
    pub fn evaluate(&self, x: &[f64]) -> Result<(f64, Vec<f64>), EvalError> {
        if let Some(cache) = self.value_cache.borrow().as_ref() {
            if cache.x == x {
                return Ok((cache.value, cache.gradient.clone()));
            }
        }

        let (value, gradient) = self.acquisition.value_grad(x)?;
        let value = value.first().copied().ok_or(EvalError::EmptyValue)?;
        let gradient = gradient.to_vec();

        *self.value_cache.borrow_mut() = Some(ValueCache {
            x: x.to_vec(),
            value,
            gradient: gradient.clone(),
        });
        Ok((value, gradient))
    }

    /// Evaluates the dense symmetric Hessian at a flat point.
    ///
    /// Computed at most once per requested point; backends extract whatever
    /// triangle they need from the dense matrix.
    ///
    /// # Errors
    ///
    /// Propagates the acquisition's evaluation error.
    pub fn hessian(&self, x: &[f64]) -> Result<Array2<f64>, EvalError> {
        if let Some(cache) = self.hessian_cache.borrow().as_ref() {
            if cache.x == x {
                return Ok(cache.hessian.clone());
            }
        }

        let hessian = self.acquisition.hessian(x)?;
        *self.hessian_cache.borrow_mut() = Some(HessianCache {
            x: x.to_vec(),
            hessian: hessian.clone(),
        });
        Ok(hessian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};

    /// f(x) = Σ xᵢ², value reported as a length-1 container.
    struct Sphere {
        calls: Cell<usize>,
        hessian_calls: Cell<usize>,
    }

    impl Sphere {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                hessian_calls: Cell::new(0),
            }
        }
    }

    impl Acquisition for Sphere {
        fn dim(&self) -> usize {
            2
        }

        fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
            self.calls.set(self.calls.get() + 1);
            let value = x.iter().map(|v| v * v).sum::<f64>();
            let grad = x.iter().map(|v| 2.0 * v).collect();
            Ok((array![value], grad))
        }

        fn hessian(&self, x: &[f64]) -> Result<Array2<f64>, EvalError> {
            self.hessian_calls.set(self.hessian_calls.get() + 1);
            Ok(Array2::eye(x.len()) * 2.0)
        }
    }

    #[test]
    fn length_one_value_container_is_scalarized() {
        let sphere = Sphere::new();
        let objective = ObjectiveFn::new(&sphere);

        let (value, gradient) = objective.evaluate(&[3.0, 4.0]).unwrap();
        assert_relative_eq!(value, 25.0);
        assert_eq!(gradient, vec![6.0, 8.0]);
    }

    #[test]
    fn repeated_point_is_memoized() {
        let sphere = Sphere::new();
        let objective = ObjectiveFn::new(&sphere);

        let first = objective.evaluate(&[1.0, 2.0]).unwrap();
        let second = objective.evaluate(&[1.0, 2.0]).unwrap();
        assert_eq!(first, second);
        assert_eq!(sphere.calls.get(), 1);

        // A new point invalidates the memo.
        objective.evaluate(&[2.0, 2.0]).unwrap();
        assert_eq!(sphere.calls.get(), 2);
    }

    #[test]
    fn hessian_computed_once_per_point() {
        let sphere = Sphere::new();
        let objective = ObjectiveFn::new(&sphere);

        let first = objective.hessian(&[1.0, 2.0]).unwrap();
        let second = objective.hessian(&[1.0, 2.0]).unwrap();
        assert_eq!(first, second);
        assert_eq!(sphere.hessian_calls.get(), 1);
    }

    #[test]
    fn empty_value_container_is_an_error() {
        struct Degenerate;

        impl Acquisition for Degenerate {
            fn dim(&self) -> usize {
                1
            }

            fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
                Ok((Array1::zeros(0), Array1::zeros(x.len())))
            }
        }

        let objective = ObjectiveFn::new(&Degenerate);
        assert!(matches!(
            objective.evaluate(&[0.0]),
            Err(EvalError::EmptyValue)
        ));
    }

    #[test]
    fn missing_hessian_surfaces_as_unavailable() {
        struct FirstOrderOnly;

        impl Acquisition for FirstOrderOnly {
            fn dim(&self) -> usize {
                1
            }

            fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
                Ok((array![0.0], Array1::zeros(x.len())))
            }
        }

        let objective = ObjectiveFn::new(&FirstOrderOnly);
        assert!(matches!(
            objective.hessian(&[0.0]),
            Err(EvalError::HessianUnavailable)
        ));
    }
}
