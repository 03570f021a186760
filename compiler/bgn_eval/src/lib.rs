//! Bgn Eval - constant folding over the node arena.
//!
//! - [`Evaluator`]: folds a restricted expression subset (literals,
//!   arithmetic, comparisons, short-circuit logic, ternaries, enum members,
//!   `config.*` flags) to a [`Value`]. Array lengths, match exhaustiveness,
//!   field arguments and enum values all go through it.
//! - [`LinearResolver`]: isolates the single free identifier of an
//!   expression, producing the inverse expression in terms of a
//!   placeholder.
//!
//! Neither mutates existing nodes; the resolver only allocates new ones.

mod error;
mod eval;
mod linear;
mod value;

pub use error::{EvalError, EvalErrorKind};
pub use eval::{Evaluator, IdentMode};
pub use linear::{LinearResolver, Solution};
pub use value::{parse_int_literal, Value};
