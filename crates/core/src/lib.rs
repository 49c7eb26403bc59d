//! Core traits and types for batch acquisition optimization.
//!
//! This crate defines the shared abstractions that solver backends and
//! experiment drivers build on:
//!
//! - [`Acquisition`] — the objective collaborator: value, gradient, and
//!   optionally a dense Hessian at a flat point
//! - [`CandidateBatch`] — a batch of `k` points of dimension `d`, convertible
//!   to and from the flat vector representation solvers work with
//! - [`BoundsSpec`] — validated per-coordinate box bounds, replicated across
//!   the batch when given per dimension

mod acquisition;
mod batch;
mod bounds;

pub use acquisition::{Acquisition, EvalError};
pub use batch::{BatchError, CandidateBatch};
pub use bounds::{BoundsError, BoundsSpec};
