//! Backend selection and the top-level solve entry point.

use std::str::FromStr;

use tracing::debug;

use batchopt_core::{Acquisition, BoundsSpec, CandidateBatch};

use crate::engine;
use crate::error::SolveError;
use crate::objective::ObjectiveFn;
use crate::quasi_newton;

/// The closed set of solver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Bound-constrained quasi-Newton search; always available.
    #[default]
    QuasiNewton,

    /// Callback-driven native engine; available only when its library loads.
    CallbackEngine,
}

impl Backend {
    /// The backend's dispatch name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::QuasiNewton => "quasi-newton",
            Self::CallbackEngine => "callback-engine",
        }
    }
}

impl FromStr for Backend {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, SolveError> {
        match s {
            "quasi-newton" => Ok(Self::QuasiNewton),
            "callback-engine" => Ok(Self::CallbackEngine),
            other => Err(SolveError::UnknownBackend(other.to_owned())),
        }
    }
}

/// How much per-iteration output a solve emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No per-iteration output.
    #[default]
    Silent,

    /// One line per iteration.
    Iterations,

    /// Everything the backend can report.
    Detailed,
}

impl Verbosity {
    /// The native engine's output-level parameter value.
    #[must_use]
    pub fn output_level(self) -> i32 {
        match self {
            Self::Silent => 0,
            Self::Iterations => 2,
            Self::Detailed => 4,
        }
    }
}

/// Options controlling a dispatched solve.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Which backend runs the search.
    pub backend: Backend,

    /// Whether the engine backend uses exact Hessians from the acquisition.
    /// Ignored by the quasi-Newton backend.
    pub use_hessian: bool,

    /// Configuration for the quasi-Newton backend. Ignored by the engine.
    pub quasi_newton: quasi_newton::Config,

    /// Per-iteration output level.
    pub verbosity: Verbosity,
}

/// How a backend finished, independent of which backend ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    /// Whether the backend reports convergence.
    pub succeeded: bool,

    /// Iterations the backend performed.
    pub iterations: usize,

    /// Human-readable termination description.
    pub message: String,

    /// The native engine's final status code, when that backend ran.
    pub native_code: Option<i32>,
}

/// A backend's solution in the flat representation.
#[derive(Debug)]
pub(crate) struct RawSolution {
    pub(crate) x: Vec<f64>,
    pub(crate) objective: f64,
    pub(crate) status: BackendStatus,
}

/// The optimized batch with its objective value and termination status.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    /// The optimized candidate batch, same shape as the input.
    pub batch: CandidateBatch,

    /// Acquisition value at the returned batch.
    pub objective: f64,

    /// How the backend finished. Non-convergence lands here, not in an error.
    pub status: BackendStatus,
}

/// Optimizes a candidate batch with the selected backend.
///
/// The batch is flattened row-major for the backend and reshaped on return,
/// so the result has the same `k×d` shape as the input. Bounds given per
/// dimension are replicated across the batch.
///
/// # Errors
///
/// Fails on configuration problems (bounds that cannot cover the batch, an
/// unavailable engine), fatal engine initialization, or an acquisition
/// evaluation failure, which is propagated unchanged. A backend that merely
/// fails to converge does not error; see [`BackendStatus::succeeded`].
pub fn dispatch<A: Acquisition + ?Sized>(
    batch: &CandidateBatch,
    bounds: &BoundsSpec,
    acquisition: &A,
    options: &SolveOptions,
) -> Result<SolverResult, SolveError> {
    let flat = batch.flatten();
    let flat_bounds = bounds.flattened(flat.len())?;
    let objective = ObjectiveFn::new(acquisition);

    debug!(
        backend = options.backend.name(),
        num_points = batch.num_points(),
        dim = batch.dim(),
        "dispatching batch optimization"
    );

    let raw = match options.backend {
        Backend::QuasiNewton => quasi_newton::solve(
            &flat,
            &flat_bounds,
            &objective,
            &options.quasi_newton,
            options.verbosity,
        )?,
        Backend::CallbackEngine => {
            let native = engine::availability::engine()
                .map_err(engine::availability::unavailable)?;
            engine::solve_with(
                native,
                &flat,
                &flat_bounds,
                options.use_hessian,
                &objective,
                options.verbosity,
            )?
        }
    };

    Ok(SolverResult {
        batch: CandidateBatch::from_flat(raw.x, objective.dim())?,
        objective: raw.objective,
        status: raw.status,
    })
}
