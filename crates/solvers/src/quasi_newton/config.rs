use thiserror::Error;

/// Configuration for the quasi-Newton backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    memory: usize,
    grad_tol: f64,
    obj_tol: f64,
    step_tol: f64,
    c1: f64,
    c2: f64,
    initial_step: f64,
    max_line_search: usize,
    boundary_tol: f64,
}

/// Errors that can occur when validating a quasi-Newton config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("memory must be non-zero")]
    Memory,

    #[error("grad_tol must be finite and non-negative")]
    GradTol,

    #[error("obj_tol must be finite and non-negative")]
    ObjTol,

    #[error("step_tol must be finite and non-negative")]
    StepTol,

    #[error("Wolfe constants must satisfy 0 < c1 < c2 < 1")]
    Wolfe,

    #[error("initial_step must be finite and positive")]
    InitialStep,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1000, 10, 1e-5).unwrap()
    }
}

fn valid_tol(tol: f64) -> bool {
    tol.is_finite() && tol >= 0.0
}

impl Config {
    /// Creates a config with the primary knobs validated; the remaining
    /// fields take standard values adjustable through the `with_*` methods.
    ///
    /// # Errors
    ///
    /// Returns an error if `memory` is zero or `grad_tol` is negative or
    /// non-finite.
    pub fn new(max_iters: usize, memory: usize, grad_tol: f64) -> Result<Self, ConfigError> {
        if memory == 0 {
            return Err(ConfigError::Memory);
        }
        if !valid_tol(grad_tol) {
            return Err(ConfigError::GradTol);
        }

        Ok(Self {
            max_iters,
            memory,
            grad_tol,
            obj_tol: 1e-9,
            step_tol: 1e-9,
            c1: 1e-4,
            c2: 0.9,
            initial_step: 1.0,
            max_line_search: 20,
            boundary_tol: 1e-12,
        })
    }

    /// Sets the relative objective-improvement tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is negative or non-finite.
    pub fn with_obj_tol(mut self, obj_tol: f64) -> Result<Self, ConfigError> {
        if !valid_tol(obj_tol) {
            return Err(ConfigError::ObjTol);
        }
        self.obj_tol = obj_tol;
        Ok(self)
    }

    /// Sets the step-norm tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is negative or non-finite.
    pub fn with_step_tol(mut self, step_tol: f64) -> Result<Self, ConfigError> {
        if !valid_tol(step_tol) {
            return Err(ConfigError::StepTol);
        }
        self.step_tol = step_tol;
        Ok(self)
    }

    /// Sets the strong-Wolfe constants.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < c1 < c2 < 1`.
    pub fn with_wolfe(mut self, c1: f64, c2: f64) -> Result<Self, ConfigError> {
        if !(c1 > 0.0 && c1 < c2 && c2 < 1.0) {
            return Err(ConfigError::Wolfe);
        }
        self.c1 = c1;
        self.c2 = c2;
        Ok(self)
    }

    /// Sets the initial line-search step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step is non-positive or non-finite.
    pub fn with_initial_step(mut self, initial_step: f64) -> Result<Self, ConfigError> {
        if !initial_step.is_finite() || initial_step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        self.initial_step = initial_step;
        Ok(self)
    }

    /// Maximum number of outer iterations.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Number of `(s, y)` pairs kept for the two-loop recursion.
    #[must_use]
    pub fn memory(&self) -> usize {
        self.memory
    }

    /// Convergence tolerance on the projected gradient's infinity norm.
    #[must_use]
    pub fn grad_tol(&self) -> f64 {
        self.grad_tol
    }

    /// Convergence tolerance on the objective improvement.
    #[must_use]
    pub fn obj_tol(&self) -> f64 {
        self.obj_tol
    }

    /// Convergence tolerance on the step norm.
    #[must_use]
    pub fn step_tol(&self) -> f64 {
        self.step_tol
    }

    /// Armijo (sufficient decrease) constant.
    #[must_use]
    pub fn c1(&self) -> f64 {
        self.c1
    }

    /// Curvature constant.
    #[must_use]
    pub fn c2(&self) -> f64 {
        self.c2
    }

    /// First step length tried by the line search.
    #[must_use]
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    /// Maximum line-search iterations per outer iteration.
    #[must_use]
    pub fn max_line_search(&self) -> usize {
        self.max_line_search
    }

    /// Tolerance for treating a coordinate as sitting on a bound.
    #[must_use]
    pub fn boundary_tol(&self) -> f64 {
        self.boundary_tol
    }
}
