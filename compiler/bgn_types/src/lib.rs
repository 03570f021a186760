//! Bgn Types - typing engine for the bgn format compiler.
//!
//! One recursive pass over a program assigns every expression a type and a
//! [`ConstantLevel`](bgn_ir::ConstantLevel), resolves identifiers through the
//! scope graph, and desugars a handful of forms in place (type-name
//! references become `TypeLiteral`, casts become `Cast`, block tails become
//! `ImplicitYield`).
//!
//! # Module Organization
//!
//! - `context`: the [`Typing`] pass state and its entry point
//! - `dispatch`: per-node dispatch and declaration typing
//! - `resolve`: identifier and type-name resolution
//! - `expr`: expression typing
//! - `assign`: definitions, assignments and `for in` binders
//! - `control`: `if`/`match`, implicit yields, exhaustiveness driver
//! - `field`: field argument partitioning
//! - `relations`: type equality, comparability, common type, literal fitting
//! - `exhaustive`: integer interval coverage

mod assign;
mod context;
mod control;
mod dispatch;
mod exhaustive;
mod expr;
mod field;
mod relations;
mod resolve;

#[cfg(test)]
mod test_helpers;

pub use context::{Typing, TypingConfig};
pub use exhaustive::{Coverage, Interval};
pub use relations::{
    aligned_bit, comparable_type, equal_type, literal_bit_size, resolve_alias,
};

/// Result of every typing function.
pub type TypeResult<T> = Result<T, bgn_diagnostic::LocationError>;
