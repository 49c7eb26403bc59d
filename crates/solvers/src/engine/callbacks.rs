//! The three evaluation callbacks the engine drives.
//!
//! Each callback validates its request code before doing any work: a callback
//! invoked with a code it does not handle reports [`CallbackOutcome::Error`]
//! to the engine rather than silently succeeding. Evaluation failures from
//! the acquisition are recorded on the handler and also reported as callback
//! errors; the caller re-raises the recorded failure once the engine returns.

use batchopt_core::{Acquisition, EvalError};

use crate::objective::ObjectiveFn;

use super::request::{self, CallbackOutcome};
use super::triangle;

/// What the engine invokes to obtain objective, gradient, and Hessian values.
pub trait EvalHandler {
    /// Writes the objective value at `x` into `out`.
    fn objective(&mut self, request: i32, x: &[f64], out: &mut f64) -> CallbackOutcome;

    /// Writes the full gradient at `x` into `out`.
    fn gradient(&mut self, request: i32, x: &[f64], out: &mut [f64]) -> CallbackOutcome;

    /// Writes the upper-triangular Hessian at `x` into `out`.
    fn hessian(&mut self, request: i32, x: &[f64], out: &mut [f64]) -> CallbackOutcome;
}

/// [`EvalHandler`] over an objective adapter.
pub struct CallbackHandler<'a, A: Acquisition + ?Sized> {
    objective: &'a ObjectiveFn<'a, A>,
    error: Option<EvalError>,
}

impl<'a, A: Acquisition + ?Sized> CallbackHandler<'a, A> {
    /// Creates a handler over the given adapter.
    #[must_use]
    pub fn new(objective: &'a ObjectiveFn<'a, A>) -> Self {
        Self {
            objective,
            error: None,
        }
    }

    /// Takes the first evaluation failure recorded during the solve, if any.
    pub fn take_error(&mut self) -> Option<EvalError> {
        self.error.take()
    }

    fn record(&mut self, error: EvalError) -> CallbackOutcome {
        if self.error.is_none() {
            self.error = Some(error);
        }
        CallbackOutcome::Error
    }
}

impl<A: Acquisition + ?Sized> EvalHandler for CallbackHandler<'_, A> {
    fn objective(&mut self, request: i32, x: &[f64], out: &mut f64) -> CallbackOutcome {
        if request != request::OBJECTIVE {
            return CallbackOutcome::Error;
        }
        match self.objective.evaluate(x) {
            Ok((value, _)) => {
                *out = value;
                CallbackOutcome::Ok
            }
            Err(e) => self.record(e),
        }
    }

    fn gradient(&mut self, request: i32, x: &[f64], out: &mut [f64]) -> CallbackOutcome {
        if request != request::GRADIENT {
            return CallbackOutcome::Error;
        }
        match self.objective.evaluate(x) {
            Ok((_, gradient)) => {
                if gradient.len() != out.len() {
                    return CallbackOutcome::Error;
                }
                out.copy_from_slice(&gradient);
                // No Jacobian: the problem has no constraints beyond the box
                // bounds, which the engine enforces natively.
                CallbackOutcome::Ok
            }
            Err(e) => self.record(e),
        }
    }

    fn hessian(&mut self, request: i32, x: &[f64], out: &mut [f64]) -> CallbackOutcome {
        match request {
            request::HESSIAN => match self.objective.hessian(x) {
                Ok(hessian) => {
                    let n = x.len();
                    if hessian.nrows() != n
                        || hessian.ncols() != n
                        || out.len() != triangle::len(n)
                    {
                        return CallbackOutcome::Error;
                    }
                    triangle::pack_upper(&hessian, out);
                    CallbackOutcome::Ok
                }
                Err(e) => self.record(e),
            },
            // Constraint part of the Lagrangian: no constraints, all zeros.
            request::HESSIAN_NO_OBJECTIVE => {
                out.fill(0.0);
                CallbackOutcome::Ok
            }
            _ => CallbackOutcome::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};

    /// f(x) = x₀² + 3 x₀ x₁ + x₁², with an exact dense Hessian.
    struct Quadratic;

    impl Acquisition for Quadratic {
        fn dim(&self) -> usize {
            2
        }

        fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
            let value = x[0] * x[0] + 3.0 * x[0] * x[1] + x[1] * x[1];
            let grad = array![2.0 * x[0] + 3.0 * x[1], 3.0 * x[0] + 2.0 * x[1]];
            Ok((array![value], grad))
        }

        fn hessian(&self, _x: &[f64]) -> Result<Array2<f64>, EvalError> {
            Ok(array![[2.0, 3.0], [3.0, 2.0]])
        }
    }

    #[test]
    fn objective_callback_writes_scalar_value() {
        let quadratic = Quadratic;
        let objective = ObjectiveFn::new(&quadratic);
        let mut handler = CallbackHandler::new(&objective);

        let mut out = f64::NAN;
        let outcome = handler.objective(request::OBJECTIVE, &[1.0, 2.0], &mut out);
        assert_eq!(outcome, CallbackOutcome::Ok);
        assert_relative_eq!(out, 11.0);
    }

    #[test]
    fn gradient_callback_writes_full_gradient() {
        let quadratic = Quadratic;
        let objective = ObjectiveFn::new(&quadratic);
        let mut handler = CallbackHandler::new(&objective);

        let mut out = [0.0; 2];
        let outcome = handler.gradient(request::GRADIENT, &[1.0, 2.0], &mut out);
        assert_eq!(outcome, CallbackOutcome::Ok);
        assert_eq!(out, [8.0, 7.0]);
    }

    #[test]
    fn hessian_callback_packs_upper_triangle_in_pattern_order() {
        let quadratic = Quadratic;
        let objective = ObjectiveFn::new(&quadratic);
        let mut handler = CallbackHandler::new(&objective);

        let mut out = [f64::NAN; 3];
        let outcome = handler.hessian(request::HESSIAN, &[0.0, 0.0], &mut out);
        assert_eq!(outcome, CallbackOutcome::Ok);
        // (0,0), (0,1), (1,1) of [[2, 3], [3, 2]].
        assert_eq!(out, [2.0, 3.0, 2.0]);
    }

    #[test]
    fn constraints_only_request_writes_zeros() {
        let quadratic = Quadratic;
        let objective = ObjectiveFn::new(&quadratic);
        let mut handler = CallbackHandler::new(&objective);

        let mut out = [f64::NAN; 3];
        let outcome = handler.hessian(request::HESSIAN_NO_OBJECTIVE, &[0.0, 0.0], &mut out);
        assert_eq!(outcome, CallbackOutcome::Ok);
        assert_eq!(out, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn unexpected_request_codes_are_rejected() {
        let quadratic = Quadratic;
        let objective = ObjectiveFn::new(&quadratic);
        let mut handler = CallbackHandler::new(&objective);

        let mut value = 0.0;
        let mut buf = [0.0; 3];
        assert_eq!(
            handler.objective(request::GRADIENT, &[0.0, 0.0], &mut value),
            CallbackOutcome::Error
        );
        assert_eq!(
            handler.gradient(request::HESSIAN, &[0.0, 0.0], &mut buf[..2]),
            CallbackOutcome::Error
        );
        assert_eq!(
            handler.hessian(request::OBJECTIVE, &[0.0, 0.0], &mut buf),
            CallbackOutcome::Error
        );
        assert!(handler.take_error().is_none());
    }

    #[test]
    fn mismatched_gradient_buffer_is_rejected() {
        let quadratic = Quadratic;
        let objective = ObjectiveFn::new(&quadratic);
        let mut handler = CallbackHandler::new(&objective);

        let mut out = [0.0; 3];
        assert_eq!(
            handler.gradient(request::GRADIENT, &[0.0, 0.0], &mut out),
            CallbackOutcome::Error
        );
    }

    #[test]
    fn evaluation_failure_is_recorded_and_reported() {
        #[derive(Debug, thiserror::Error)]
        #[error("posterior not positive definite")]
        struct BadPosterior;

        struct Failing;

        impl Acquisition for Failing {
            fn dim(&self) -> usize {
                1
            }

            fn value_grad(&self, _x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
                Err(EvalError::Evaluation(Box::new(BadPosterior)))
            }
        }

        let objective = ObjectiveFn::new(&Failing);
        let mut handler = CallbackHandler::new(&objective);

        let mut out = 0.0;
        assert_eq!(
            handler.objective(request::OBJECTIVE, &[0.0], &mut out),
            CallbackOutcome::Error
        );
        assert!(matches!(
            handler.take_error(),
            Some(EvalError::Evaluation(_))
        ));
    }
}
