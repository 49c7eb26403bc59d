//! The calling convention shared by real and test engines.

use super::callbacks::EvalHandler;
use crate::error::SolveError;

/// Integer parameters understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Output verbosity (0 silent, 2 per-iteration, 4 detailed).
    OutputLevel,

    /// How the engine obtains second-order information ([`HessianMode`]).
    HessianMode,

    /// Whether Hessian callbacks may be asked for the Lagrangian with the
    /// objective excluded (the `HESSIAN_NO_OBJECTIVE` request).
    HessianNoObjective,
}

impl Param {
    /// The engine's numeric parameter identifier.
    #[must_use]
    pub fn native_id(self) -> i32 {
        match self {
            Self::OutputLevel => 10,
            Self::HessianMode => 20,
            Self::HessianNoObjective => 21,
        }
    }

    /// Name used in setup error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::OutputLevel => "output level",
            Self::HessianMode => "Hessian mode",
            Self::HessianNoObjective => "Hessian-no-objective support",
        }
    }
}

/// How the engine obtains second-order information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HessianMode {
    /// Exact analytic Hessians from the Hessian callback.
    Exact,

    /// A quasi-Newton approximation; the Hessian callback is never invoked.
    QuasiNewton,
}

impl HessianMode {
    /// The engine's numeric mode identifier.
    #[must_use]
    pub fn native_id(self) -> i32 {
        match self {
            Self::Exact => 1,
            Self::QuasiNewton => 2,
        }
    }
}

/// Optimization direction declared to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Minimize,
}

impl Goal {
    #[must_use]
    pub fn native_id(self) -> i32 {
        0
    }
}

/// Objective classification declared to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveType {
    /// General nonlinear, non-quadratic objective.
    General,
}

impl ObjectiveType {
    #[must_use]
    pub fn native_id(self) -> i32 {
        0
    }
}

/// Everything the engine needs to initialize a problem.
///
/// The problem always has zero general constraints; only the box bounds are
/// declared, and the engine enforces them natively. `hess_rows`/`hess_cols`
/// are the parallel index lists of the dense upper-triangular Hessian
/// sparsity pattern over all variables, in the shared enumeration order.
#[derive(Debug, Clone)]
pub struct ProblemSpec<'a> {
    pub goal: Goal,
    pub objective_type: ObjectiveType,
    pub lower: &'a [f64],
    pub upper: &'a [f64],
    pub hess_rows: &'a [i32],
    pub hess_cols: &'a [i32],
    pub x_init: &'a [f64],
}

/// The uniform contract over native engine implementations.
///
/// Methods returning `i32` follow the engine's status convention: zero is
/// success, anything else is the engine's own error code. Fatal versus
/// non-fatal interpretation of those codes is the caller's business.
pub trait EngineApi {
    /// An opaque per-solve engine handle.
    type Context;

    /// Creates a solver context, or `None` when the engine refuses (for
    /// example a missing or invalid license).
    fn new_context(&self) -> Option<Self::Context>;

    /// Sets an integer parameter; returns the engine status code.
    fn set_param(&self, ctx: &mut Self::Context, param: Param, value: i32) -> i32;

    /// Declares the problem; returns the engine status code.
    fn init_problem(&self, ctx: &mut Self::Context, spec: &ProblemSpec<'_>) -> i32;

    /// Runs the engine's own search loop, driving the handler's callbacks.
    ///
    /// On return `x` holds the engine's best point. The `Ok` payload is the
    /// engine's final solve status (zero on success).
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that prevent the solve from
    /// running at all, such as callback registration being rejected.
    fn solve(
        &self,
        ctx: &mut Self::Context,
        x: &mut [f64],
        handler: &mut dyn EvalHandler,
    ) -> Result<i32, SolveError>;

    /// Number of iterations the engine performed.
    fn iterations(&self, ctx: &Self::Context) -> usize;

    /// Releases the context's native resources.
    fn release(&self, ctx: &mut Self::Context);
}

/// Releases the engine context on every exit path.
pub(crate) struct ContextGuard<'e, E: EngineApi> {
    engine: &'e E,
    ctx: Option<E::Context>,
}

impl<'e, E: EngineApi> ContextGuard<'e, E> {
    /// Acquires a context, or `None` when the engine refuses to create one.
    pub(crate) fn acquire(engine: &'e E) -> Option<Self> {
        engine.new_context().map(|ctx| Self {
            engine,
            ctx: Some(ctx),
        })
    }

    pub(crate) fn context(&mut self) -> &mut E::Context {
        // Present from acquire until drop.
        self.ctx.as_mut().expect("context released before drop")
    }
}

impl<E: EngineApi> Drop for ContextGuard<'_, E> {
    fn drop(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            self.engine.release(&mut ctx);
        }
    }
}
