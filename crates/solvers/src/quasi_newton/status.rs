/// Why the quasi-Newton backend stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The projected gradient's infinity norm fell below the tolerance.
    GradientConverged,

    /// The objective improvement fell below the tolerance.
    ObjectiveConverged,

    /// The step norm fell below the tolerance.
    StepConverged,

    /// The iteration limit was reached without converging.
    MaxIterations,
}

impl Reason {
    /// Whether this termination counts as a successful solve.
    #[must_use]
    pub fn succeeded(self) -> bool {
        !matches!(self, Self::MaxIterations)
    }

    /// Human-readable status message.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::GradientConverged => "converged: projected gradient below tolerance",
            Self::ObjectiveConverged => "converged: objective improvement below tolerance",
            Self::StepConverged => "converged: step size below tolerance",
            Self::MaxIterations => "stopped: iteration limit reached",
        }
    }
}
