//! Bgn IR - node arena and scope graph
//!
//! This crate holds the data every later phase works on:
//! - [`Span`]/[`Loc`] source locations
//! - the [`Ast`] arena of [`Node`]s addressed by [`NodeId`]
//! - the lexical [`Scope`] graph addressed by [`ScopeId`]
//! - the slot table ([`slots`]) that says which edges form the tree
//! - [`AstBuilder`], which builds parsed programs
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: nodes refer to each other by `NodeId(u32)`;
//!   the tree is acyclic only over owned edges, weak edges may point
//!   anywhere (definitions, replaced nodes, enclosing members).
//! - **One Edge Table**: traversal, replacement, deep copy and interchange
//!   validation all read [`NodeKind::visit_slots`].
//! - **Replace, Don't Mutate Kinds**: desugaring allocates a new node and
//!   writes it into the parent's slot, keeping the old one as `base`.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod ast;
mod builder;
mod display;
mod escape;
mod extract;
mod id;
pub mod node;
mod ops;
mod scope;
pub mod slots;
mod span;

#[cfg(feature = "interchange")]
pub mod interchange;

pub use ast::{Ast, Children, Shift};
pub use builder::{Arm, AstBuilder};
pub use display::{member_name, type_to_string};
pub use escape::{unescape, EscapeError};
pub use extract::{config_name, extract_config, extract_name, ConfigDesc, ExtractMode};
pub use id::{NodeId, ScopeId};
pub use node::*;
pub use ops::{
    BinaryOp, BitAlignment, BlockTrait, ConstantLevel, Endian, FieldArgumentMapping, IOMethod,
    IdentUsage, OrderType, SpecialLiteralKind, UnaryOp,
};
pub use scope::Scope;
pub use slots::{Edge, Expect, Slot, SlotVisitor, SlotVisitorMut};
pub use span::{Loc, Span};
