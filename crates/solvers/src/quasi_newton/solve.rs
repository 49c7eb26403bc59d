use std::collections::VecDeque;

use tracing::debug;

use batchopt_core::{Acquisition, BoundsError, EvalError};

use crate::dispatch::{BackendStatus, RawSolution, Verbosity};
use crate::error::SolveError;
use crate::objective::ObjectiveFn;

use super::{Config, Reason};

/// An `(s, y)` curvature pair kept for the two-loop recursion.
struct Pair {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

/// An accepted line-search point with its evaluation.
struct StepEval {
    x: Vec<f64>,
    f: f64,
    grad: Vec<f64>,
}

/// Minimizes the objective over the box from `x_init`.
///
/// The initial point is clamped into the box; the returned point satisfies
/// the bounds on every coordinate. The backend evaluates value+gradient only.
///
/// # Errors
///
/// Returns an error if the bounds length does not match `x_init`, or if an
/// adapter evaluation fails (propagated unchanged, no retry).
pub fn solve<A: Acquisition + ?Sized>(
    x_init: &[f64],
    bounds: &[(f64, f64)],
    objective: &ObjectiveFn<'_, A>,
    config: &Config,
    verbosity: Verbosity,
) -> Result<RawSolution, SolveError> {
    let n = x_init.len();
    if bounds.len() != n {
        return Err(BoundsError::Length {
            given: bounds.len(),
            needed: n,
        }
        .into());
    }

    let mut x: Vec<f64> = x_init
        .iter()
        .zip(bounds)
        .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
        .collect();

    let (mut f, raw_grad) = objective.evaluate(&x)?;
    let mut grad = project(&x, raw_grad, bounds, config.boundary_tol());

    let mut history: VecDeque<Pair> = VecDeque::with_capacity(config.memory());
    let mut best_f = f;
    let mut best_x = x.clone();

    let mut reason = Reason::MaxIterations;
    let mut iters = config.max_iters();

    for iter in 0..config.max_iters() {
        let gnorm = inf_norm(&grad);
        if gnorm <= config.grad_tol() {
            reason = Reason::GradientConverged;
            iters = iter;
            break;
        }

        let direction = clamp_direction(&x, &descent_direction(&grad, &history), bounds);
        let g_dot_d = dot(&grad, &direction);
        if g_dot_d >= 0.0 {
            // No descent direction remains inside the box.
            reason = Reason::StepConverged;
            iters = iter;
            break;
        }

        let step = line_search(objective, &x, f, g_dot_d, &direction, bounds, config)?;

        if verbosity >= Verbosity::Iterations {
            debug!(iter, objective = step.f, grad_norm = gnorm, "quasi-newton iteration");
        }

        let s: Vec<f64> = step.x.iter().zip(&x).map(|(a, b)| a - b).collect();
        let step_norm = norm2(&s);
        let new_grad = project(&step.x, step.grad, bounds, config.boundary_tol());
        let y: Vec<f64> = new_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();

        let sy = dot(&s, &y);
        if sy > config.boundary_tol() {
            if history.len() == config.memory() {
                history.pop_front();
            }
            history.push_back(Pair {
                s,
                y,
                rho: 1.0 / sy,
            });
        }

        let obj_drop = (f - step.f).abs();
        x = step.x;
        f = step.f;
        grad = new_grad;

        if f < best_f {
            best_f = f;
            best_x = x.clone();
        }

        if obj_drop <= config.obj_tol() * f.abs().max(1.0) {
            reason = Reason::ObjectiveConverged;
            iters = iter + 1;
            break;
        }
        if step_norm <= config.step_tol() {
            reason = Reason::StepConverged;
            iters = iter + 1;
            break;
        }
    }

    Ok(RawSolution {
        x: best_x,
        objective: best_f,
        status: BackendStatus {
            succeeded: reason.succeeded(),
            iterations: iters,
            message: reason.message().to_string(),
            native_code: None,
        },
    })
}

/// L-BFGS two-loop recursion, negated into a descent direction.
fn descent_direction(grad: &[f64], history: &VecDeque<Pair>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alpha = vec![0.0; history.len()];

    for (i, pair) in history.iter().enumerate().rev() {
        alpha[i] = pair.rho * dot(&pair.s, &q);
        axpy(-alpha[i], &pair.y, &mut q);
    }

    if let Some(last) = history.back() {
        let yy = dot(&last.y, &last.y);
        if yy > 0.0 {
            let scale = dot(&last.s, &last.y) / yy;
            for qi in &mut q {
                *qi *= scale;
            }
        }
    }

    for (i, pair) in history.iter().enumerate() {
        let beta = pair.rho * dot(&pair.y, &q);
        axpy(alpha[i] - beta, &pair.s, &mut q);
    }

    for qi in &mut q {
        *qi = -*qi;
    }
    q
}

/// Strong-Wolfe line search using the adapter's analytic gradients.
fn line_search<A: Acquisition + ?Sized>(
    objective: &ObjectiveFn<'_, A>,
    x0: &[f64],
    f0: f64,
    g_dot_d: f64,
    direction: &[f64],
    bounds: &[(f64, f64)],
    config: &Config,
) -> Result<StepEval, EvalError> {
    let mut lo = 0.0;
    let mut hi = config.initial_step();
    let mut alpha = hi;
    let mut fallback: Option<StepEval> = None;

    for _ in 0..config.max_line_search() {
        let trial = trial_point(x0, direction, alpha, bounds);
        let (f, grad) = objective.evaluate(&trial)?;

        if f > f0 + config.c1() * alpha * g_dot_d {
            hi = alpha;
        } else {
            let gd = dot(&grad, direction);
            let eval = StepEval { x: trial, f, grad };
            if gd.abs() <= -config.c2() * g_dot_d {
                return Ok(eval);
            }
            if gd >= 0.0 {
                hi = alpha;
            } else {
                lo = alpha;
            }
            fallback = Some(eval);
        }

        if hi - lo < config.boundary_tol() {
            break;
        }
        alpha = 0.5 * (lo + hi);
    }

    if let Some(eval) = fallback {
        return Ok(eval);
    }

    // No point satisfied sufficient decrease; evaluate the final midpoint so
    // the outer loop observes a tiny step and terminates.
    let alpha = (0.5 * (lo + hi)).max(config.boundary_tol());
    let trial = trial_point(x0, direction, alpha, bounds);
    let (f, grad) = objective.evaluate(&trial)?;
    Ok(StepEval { x: trial, f, grad })
}

fn trial_point(x0: &[f64], direction: &[f64], alpha: f64, bounds: &[(f64, f64)]) -> Vec<f64> {
    x0.iter()
        .zip(direction)
        .zip(bounds)
        .map(|((&xi, &di), &(lo, hi))| (xi + alpha * di).clamp(lo, hi))
        .collect()
}

/// Zeroes gradient components that point out of the box at active bounds.
fn project(x: &[f64], mut grad: Vec<f64>, bounds: &[(f64, f64)], tol: f64) -> Vec<f64> {
    for i in 0..x.len() {
        let (lo, hi) = bounds[i];
        if ((x[i] - lo).abs() <= tol && grad[i] > 0.0) || ((x[i] - hi).abs() <= tol && grad[i] < 0.0)
        {
            grad[i] = 0.0;
        }
    }
    grad
}

/// Clamps the direction so a unit step cannot leave the box.
fn clamp_direction(x: &[f64], direction: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    x.iter()
        .zip(direction)
        .zip(bounds)
        .map(|((&xi, &di), &(lo, hi))| {
            if di > 0.0 {
                di.min(hi - xi)
            } else if di < 0.0 {
                di.max(lo - xi)
            } else {
                0.0
            }
        })
        .collect()
}

fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Dot product with Kahan compensation.
fn dot(a: &[f64], b: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for (x, y) in a.iter().zip(b) {
        let product = x * y;
        let t = sum + product;
        c += product - (t - sum);
        sum = t;
    }
    sum + c
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn norm2(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}
