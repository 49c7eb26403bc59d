//! Request and status codes shared with the native engine.

/// The engine wants the objective value.
pub const OBJECTIVE: i32 = 1;

/// The engine wants the objective gradient.
pub const GRADIENT: i32 = 2;

/// The engine wants the full Hessian of the objective.
pub const HESSIAN: i32 = 3;

/// The engine wants the Hessian of the constraints only (objective excluded).
///
/// With zero constraints declared this is an all-zeros matrix.
pub const HESSIAN_NO_OBJECTIVE: i32 = 7;

/// Status code a callback returns to report a contract violation.
pub const CALLBACK_ERROR: i32 = -500;

/// Outcome of one callback invocation, reported back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The requested quantity was written into the engine's buffer.
    Ok,

    /// The callback could not satisfy the request (wrong request code,
    /// mismatched buffer, or a failed evaluation).
    Error,
}

impl CallbackOutcome {
    /// The numeric status the engine expects.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => CALLBACK_ERROR,
        }
    }
}
