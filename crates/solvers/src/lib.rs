//! Solver backends for batch acquisition optimization.
//!
//! A candidate batch is flattened into a single vector, minimized over box
//! bounds by one of two interchangeable backends, and reshaped on return:
//!
//! - [`quasi_newton`]: a bound-constrained quasi-Newton search using analytic
//!   gradients only. Always available.
//! - [`engine`]: a callback-driven native optimization engine that can
//!   exploit exact Hessians. Available only when its library loads; a missing
//!   library is detected once and reported as a configuration error when the
//!   backend is selected.
//!
//! [`dispatch`](dispatch::dispatch) is the entry point; backends are selected
//! by name through [`Backend`].

pub mod dispatch;
pub mod engine;
pub mod objective;
pub mod quasi_newton;

mod error;

pub use dispatch::{Backend, BackendStatus, SolveOptions, SolverResult, Verbosity, dispatch};
pub use error::SolveError;
pub use objective::ObjectiveFn;
