//! Tree-walking evaluator for compiled setting expressions.
//!
//! # Architecture
//!
//! - `evaluate`: executes a [`CompiledUnit`] against a datasource view
//! - `evaluate_setting`: `evaluate` plus the bare-identifier recovery rule
//! - `evaluate_binary` / `evaluate_unary`: direct enum-based operator
//!   dispatch
//! - [`DatasourceView`]: the read-only seam to the snapshot store
//!
//! Evaluation is pure: it reads the snapshot, allocates the result, and
//! has no other effects. Failures come back as [`EvalError`]; the engine
//! decides what to retain and what to surface.

pub mod errors;
mod evaluator;
mod operators;
mod unary_operators;

pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use evaluator::{evaluate, evaluate_setting, is_bare_word, DatasourceView};
pub use operators::evaluate_binary;
pub use unary_operators::evaluate_unary;

#[cfg(test)]
mod tests;
