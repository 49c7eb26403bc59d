//! Bound-constrained limited-memory quasi-Newton backend.
//!
//! # Algorithm
//!
//! A projected L-BFGS: the two-loop recursion builds a quasi-Newton descent
//! direction from a short history of `(s, y)` pairs, the direction is clamped
//! so a unit step cannot leave the box, and a strong-Wolfe line search picks
//! the step length. Gradient components pointing out of the box at active
//! bounds are projected to zero, so convergence is measured against the
//! projected gradient.
//!
//! This backend only ever asks the objective adapter for combined
//! value+gradient evaluations — never a Hessian. Evaluation errors from the
//! adapter propagate to the caller unchanged; there is no retry here.
//!
//! # Status
//!
//! Hitting the iteration limit is reported as a non-success in the returned
//! status record, not as an error: the best point found so far is still
//! returned.

mod config;
mod solve;
mod status;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};
pub use status::Reason;

pub(crate) use solve::solve;
