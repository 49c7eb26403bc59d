//! Callback-driven second-order backend.
//!
//! Unlike the quasi-Newton backend, this one does not call the objective
//! itself. It hands the problem to an external native optimization engine
//! that owns the search loop and obtains objective, gradient, and Hessian
//! values by invoking registered callbacks, each tagged with a request code
//! saying which quantity is wanted.
//!
//! # Availability
//!
//! The engine is an optional native library. The first time it is needed the
//! library is probed exactly once ([`availability`]); a failed load is
//! recorded, not raised, and selecting this backend afterwards produces a
//! clear configuration error instead of aborting the process.
//!
//! # Hessian storage
//!
//! The engine stores the objective Hessian as the upper triangle of a
//! symmetric matrix, flattened in row-major `(row, col)` order with
//! `row ≤ col`. The same enumeration ([`triangle`]) is used both to declare
//! the sparsity pattern at problem initialization and to fill values inside
//! the Hessian callback; a divergence between the two would corrupt the
//! Hessian silently.

mod api;
mod callbacks;
mod native;
mod solve;

pub mod availability;
pub mod request;

pub(crate) mod triangle;


pub use api::{EngineApi, Goal, HessianMode, ObjectiveType, Param, ProblemSpec};
pub use callbacks::{CallbackHandler, EvalHandler};

pub(crate) use solve::solve_with;
