use tracing::warn;

use batchopt_core::Acquisition;

use crate::dispatch::{BackendStatus, RawSolution, Verbosity};
use crate::error::SolveError;
use crate::objective::ObjectiveFn;

use super::api::{ContextGuard, EngineApi, Goal, HessianMode, ObjectiveType, Param, ProblemSpec};
use super::callbacks::CallbackHandler;
use super::triangle;

/// Runs one solve through an engine implementing [`EngineApi`].
///
/// The engine owns the search loop; this function configures it, registers
/// the callback handler, and interprets its status codes. A non-zero *final*
/// status is not an error — the engine's best point is still returned, with
/// the status recorded. A non-zero *initialization* status is fatal.
///
/// # Errors
///
/// Fails if the engine refuses a context, rejects configuration or problem
/// initialization, or if a callback evaluation failed (the recorded failure
/// is re-raised unchanged once the engine returns).
pub(crate) fn solve_with<E: EngineApi, A: Acquisition + ?Sized>(
    engine: &E,
    x_init: &[f64],
    bounds: &[(f64, f64)],
    use_hessian: bool,
    objective: &ObjectiveFn<'_, A>,
    verbosity: Verbosity,
) -> Result<RawSolution, SolveError> {
    let n = x_init.len();
    let mut guard = ContextGuard::acquire(engine).ok_or(SolveError::EngineContext)?;

    let hess_mode = if use_hessian {
        HessianMode::Exact
    } else {
        HessianMode::QuasiNewton
    };
    let params = [
        (Param::OutputLevel, verbosity.output_level()),
        (Param::HessianMode, hess_mode.native_id()),
        (Param::HessianNoObjective, i32::from(use_hessian)),
    ];
    for (param, value) in params {
        let code = engine.set_param(guard.context(), param, value);
        if code != 0 {
            return Err(SolveError::EngineSetup {
                what: param.name(),
                code,
            });
        }
    }

    let (lower, upper): (Vec<f64>, Vec<f64>) = bounds.iter().copied().unzip();
    let mut x: Vec<f64> = x_init
        .iter()
        .zip(bounds)
        .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
        .collect();

    // The same enumeration later fills the values inside the Hessian
    // callback; declaring it from anywhere else risks silent corruption.
    let (hess_rows, hess_cols): (Vec<i32>, Vec<i32>) = triangle::upper_indices(n)
        .map(|(row, col)| (row as i32, col as i32))
        .unzip();

    let spec = ProblemSpec {
        goal: Goal::Minimize,
        objective_type: ObjectiveType::General,
        lower: &lower,
        upper: &upper,
        hess_rows: &hess_rows,
        hess_cols: &hess_cols,
        x_init: &x,
    };
    let code = engine.init_problem(guard.context(), &spec);
    if code != 0 {
        return Err(SolveError::EngineInit { code });
    }

    let mut handler = CallbackHandler::new(objective);
    let status = engine.solve(guard.context(), &mut x, &mut handler)?;

    if let Some(error) = handler.take_error() {
        return Err(error.into());
    }

    let iterations = engine.iterations(guard.context());
    let (objective_value, _) = objective.evaluate(&x)?;

    let succeeded = status == 0;
    let message = if succeeded {
        "engine converged".to_string()
    } else {
        warn!(status, "engine finished with a non-zero status");
        format!("engine finished with status {status}")
    };

    Ok(RawSolution {
        x,
        objective: objective_value,
        status: BackendStatus {
            succeeded,
            iterations,
            message,
            native_code: Some(status),
        },
    })
}
