use thiserror::Error;

use batchopt_core::{BatchError, BoundsError, EvalError};

use crate::quasi_newton::ConfigError;

/// Errors that can occur when dispatching or running an optimization.
///
/// Non-convergence is deliberately *not* represented here: a backend that
/// finishes with a non-zero status still returns its best point, flagged in
/// [`BackendStatus`](crate::dispatch::BackendStatus).
#[derive(Debug, Error)]
pub enum SolveError {
    /// The backend name is not in the recognized set.
    #[error("unrecognized solver backend `{0}`; expected `quasi-newton` or `callback-engine`")]
    UnknownBackend(String),

    /// The callback engine was selected but its native library is not loaded.
    #[error(
        "the callback-engine backend is unavailable ({reason}); \
         install the native engine library or select `quasi-newton`"
    )]
    EngineUnavailable { reason: String },

    /// The native engine refused to create a context.
    #[error("failed to create an engine context; check that the engine license is valid")]
    EngineContext,

    /// The native engine rejected a configuration call.
    #[error("engine rejected {what} with status {code}")]
    EngineSetup { what: &'static str, code: i32 },

    /// The native engine rejected problem initialization.
    #[error("engine problem initialization failed with status {code}")]
    EngineInit { code: i32 },

    /// The acquisition failed to evaluate; propagated unchanged.
    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("invalid bounds: {0}")]
    Bounds(#[from] BoundsError),

    #[error("invalid batch: {0}")]
    Batch(#[from] BatchError),

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
