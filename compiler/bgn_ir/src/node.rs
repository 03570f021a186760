//! Node payloads.
//!
//! # Design
//! A node is a [`Loc`], a [`NodeKind`] payload and the two typing results
//! every expression carries (`expr_type`, `constant_level`). `NodeKind` is a
//! closed enum, so every "what kind of node is this" question is an
//! exhaustive `match` or a [`Downcast`] lookup; base categories (expression,
//! type, statement...) are answered by [`NodeType`].
//!
//! Fields holding a [`NodeId`] are either *owned* (the structural child,
//! visited by traversal) or *weak* (a lookup-only alias). Which is which is
//! declared once, in [`crate::slots`], and nowhere else.

use crate::ops::{
    BinaryOp, BitAlignment, BlockTrait, ConstantLevel, Endian, FieldArgumentMapping, IOMethod,
    IdentUsage, OrderType, SpecialLiteralKind, UnaryOp,
};
use crate::{Loc, NodeId, ScopeId};

/// One slot of the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub loc: Loc,
    #[cfg_attr(feature = "interchange", serde(flatten))]
    pub kind: NodeKind,
    /// Type assigned by typing. Weak: types synthesized during typing are
    /// owned by the arena, not by the tree.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub expr_type: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub constant_level: ConstantLevel,
}

impl Node {
    pub fn new(loc: Loc, kind: NodeKind) -> Self {
        Node {
            loc,
            kind,
            expr_type: None,
            constant_level: ConstantLevel::Unknown,
        }
    }

    #[inline]
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

macro_rules! node_kinds {
    (
        payload { $($name:ident),* $(,)? }
        unit { $($unit:ident),* $(,)? }
    ) => {
        /// Payload of a node.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(
            feature = "interchange",
            serde(tag = "node_type", content = "body", rename_all = "snake_case")
        )]
        pub enum NodeKind {
            $($name($name),)*
            $($unit,)*
        }

        /// Runtime tag of a node.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum NodeType {
            $($name,)*
            $($unit,)*
        }

        impl NodeKind {
            pub const fn node_type(&self) -> NodeType {
                match self {
                    $(NodeKind::$name(_) => NodeType::$name,)*
                    $(NodeKind::$unit => NodeType::$unit,)*
                }
            }
        }

        $(
            impl From<$name> for NodeKind {
                fn from(value: $name) -> Self {
                    NodeKind::$name(value)
                }
            }

            impl Downcast for $name {
                const NODE_TYPE: NodeType = NodeType::$name;

                fn downcast(kind: &NodeKind) -> Option<&Self> {
                    match kind {
                        NodeKind::$name(n) => Some(n),
                        _ => None,
                    }
                }

                fn downcast_mut(kind: &mut NodeKind) -> Option<&mut Self> {
                    match kind {
                        NodeKind::$name(n) => Some(n),
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Typed view of one [`NodeKind`] variant.
pub trait Downcast: Sized {
    const NODE_TYPE: NodeType;
    fn downcast(kind: &NodeKind) -> Option<&Self>;
    fn downcast_mut(kind: &mut NodeKind) -> Option<&mut Self>;
}

node_kinds! {
    payload {
        Program,
        // expressions
        Binary, Unary, Cond, Ident, Call, If, MemberAccess, Paren, Index, Match,
        Range, TmpVar, Import, Cast, Available, SpecifyOrder, IOOperation, OrCond,
        Identity, ExplicitError,
        // literals
        IntLiteral, BoolLiteral, StrLiteral, CharLiteral, RegexLiteral, TypeLiteral,
        SpecialLiteral,
        // statements
        Loop, IndentBlock, ScopedStatement, MatchBranch, UnionCandidate, Return,
        Assert, ImplicitYield, Metadata,
        // members
        Field, FieldArgument, Format, State, Enum, EnumMember, Function,
        // types
        IntType, FloatType, IdentType, IntLiteralType, StrLiteralType,
        RegexLiteralType, ArrayType, FunctionType, StructType, StructUnionType,
        UnionType, RangeType, EnumType,
    }
    unit {
        Break, Continue, VoidType, BoolType, MetaType,
    }
}

impl NodeType {
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::BoolLiteral
                | Self::StrLiteral
                | Self::CharLiteral
                | Self::RegexLiteral
                | Self::TypeLiteral
                | Self::SpecialLiteral
        )
    }

    /// Expressions, literals included.
    pub const fn is_expr(self) -> bool {
        self.is_literal()
            || matches!(
                self,
                Self::Binary
                    | Self::Unary
                    | Self::Cond
                    | Self::Ident
                    | Self::Call
                    | Self::If
                    | Self::MemberAccess
                    | Self::Paren
                    | Self::Index
                    | Self::Match
                    | Self::Range
                    | Self::TmpVar
                    | Self::Import
                    | Self::Cast
                    | Self::Available
                    | Self::SpecifyOrder
                    | Self::IOOperation
                    | Self::OrCond
                    | Self::Identity
                    | Self::ExplicitError
            )
    }

    pub const fn is_member(self) -> bool {
        matches!(
            self,
            Self::Field
                | Self::Format
                | Self::State
                | Self::Enum
                | Self::EnumMember
                | Self::Function
        )
    }

    /// Statements, members included.
    pub const fn is_stmt(self) -> bool {
        self.is_member()
            || matches!(
                self,
                Self::Loop
                    | Self::IndentBlock
                    | Self::ScopedStatement
                    | Self::MatchBranch
                    | Self::UnionCandidate
                    | Self::Return
                    | Self::Break
                    | Self::Continue
                    | Self::Assert
                    | Self::ImplicitYield
                    | Self::Metadata
            )
    }

    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Self::IntType
                | Self::FloatType
                | Self::IdentType
                | Self::IntLiteralType
                | Self::StrLiteralType
                | Self::RegexLiteralType
                | Self::VoidType
                | Self::BoolType
                | Self::ArrayType
                | Self::FunctionType
                | Self::StructType
                | Self::StructUnionType
                | Self::UnionType
                | Self::RangeType
                | Self::EnumType
                | Self::MetaType
        )
    }
}

// ============================================================================
// Program
// ============================================================================

/// Root of one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    pub struct_type: Option<NodeId>,
    pub elements: Vec<NodeId>,
    pub global_scope: ScopeId,
    /// `Metadata` elements, weak.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub metadata: Vec<NodeId>,
    /// Active byte-order directive, weak.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub endian: Option<NodeId>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Binary {
    pub op: BinaryOp,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Unary {
    pub op: UnaryOp,
    pub expr: NodeId,
}

/// `cond ? then : els`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Cond {
    pub cond: NodeId,
    pub then: NodeId,
    pub els: NodeId,
}

/// A name occurrence.
///
/// `base` points at the defining node for definitions, or at the defining
/// `Ident` for references, so references form a chain back to the
/// definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Ident {
    pub ident: String,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub usage: IdentUsage,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub base: Option<NodeId>,
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Call {
    pub callee: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct If {
    pub cond_scope: Option<ScopeId>,
    pub cond: NodeId,
    /// `IndentBlock`.
    pub then: NodeId,
    /// `IndentBlock` or a chained `If`.
    pub els: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberAccess {
    pub target: NodeId,
    /// `Ident`.
    pub member: NodeId,
    /// Resolved member definition, weak.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub base: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Paren {
    pub expr: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Index {
    pub expr: NodeId,
    pub index: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    pub cond_scope: Option<ScopeId>,
    /// Scrutinee; absent for a trial match (`match:` over boolean arms).
    pub cond: Option<NodeId>,
    pub branches: Vec<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub trial_match: bool,
    /// Union of the branch bodies; synthesized by typing when absent.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub struct_union_type: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub op: BinaryOp,
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

/// Placeholder introduced by symbolic rewriting.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct TmpVar {
    pub tmp_var: u64,
}

/// Resolved `config.import("path")`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Import {
    pub path: String,
    /// Replaced `Call`, weak.
    pub base: NodeId,
    /// Imported `Program`.
    pub import_desc: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Cast {
    /// Replaced `Call`, weak.
    pub base: Option<NodeId>,
    pub arguments: Vec<NodeId>,
}

/// `available(ident)`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Available {
    /// Replaced `Call`, weak.
    pub base: Option<NodeId>,
    pub target: NodeId,
}

/// `input.endian = ...` / `input.bit_order = ...`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecifyOrder {
    /// Replaced `Binary`, weak.
    pub base: Option<NodeId>,
    pub order_type: OrderType,
    pub order: NodeId,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub order_value: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct IOOperation {
    /// Replaced `Call`/`MemberAccess`, weak.
    pub base: Option<NodeId>,
    pub method: IOMethod,
    pub arguments: Vec<NodeId>,
}

/// `a | b | c` in a match branch condition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct OrCond {
    /// Replaced `Binary`, weak.
    pub base: Option<NodeId>,
    pub cond: Vec<NodeId>,
}

/// `error("message", args...)`: decoding fails with a message.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplicitError {
    /// Replaced call, weak.
    pub base: Option<NodeId>,
    pub message: NodeId,
    pub arguments: Vec<NodeId>,
}

/// Transparent wrapper, used around `if` conditions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    pub expr: NodeId,
}

// ============================================================================
// Literals
// ============================================================================

/// Integer literal in source spelling (`10`, `0x1f`, `0b101`, `0o17`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct IntLiteral {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolLiteral {
    pub value: bool,
}

/// String literal, `value` keeps the quotes and escapes as written.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct StrLiteral {
    pub value: String,
    /// Byte length after unescaping.
    pub length: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct CharLiteral {
    pub value: String,
    pub code: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct RegexLiteral {
    pub value: String,
}

/// A type used in expression position (`u8` in `input.get(u8)`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeLiteral {
    pub type_literal: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialLiteral {
    pub kind: SpecialLiteralKind,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Loop {
    pub cond_scope: Option<ScopeId>,
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub step: Option<NodeId>,
    pub body: NodeId,
}

/// Indented statement block with its own scope.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct IndentBlock {
    pub struct_type: Option<NodeId>,
    pub elements: Vec<NodeId>,
    pub scope: ScopeId,
    /// `Metadata` elements, weak.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub metadata: Vec<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub block_traits: BlockTrait,
}

/// Single statement after `=>` in a match branch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopedStatement {
    pub struct_type: Option<NodeId>,
    pub statement: NodeId,
    pub scope: ScopeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchBranch {
    /// Owning `Match`, weak.
    pub belong: Option<NodeId>,
    pub cond: NodeId,
    /// `IndentBlock` or `ScopedStatement`.
    pub then: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionCandidate {
    pub cond: Option<NodeId>,
    pub field: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Return {
    pub expr: Option<NodeId>,
    pub related_function: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Assert {
    pub cond: NodeId,
}

/// Terminal expression statement that produces its block's value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ImplicitYield {
    pub expr: NodeId,
}

/// `config.X = v` / `config.X(v...)` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Replaced expression, weak.
    pub base: Option<NodeId>,
    pub name: String,
    pub values: Vec<NodeId>,
}

// ============================================================================
// Members
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    /// Absent for anonymous fields (`:u8`).
    pub ident: Option<NodeId>,
    pub field_type: NodeId,
    pub arguments: Option<NodeId>,
    pub belong: Option<NodeId>,
    pub belong_struct: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_state_variable: bool,
}

/// Parenthesized arguments after a field's type, and what typing made of
/// them. Only `collected_arguments` and `metadata` are owned; every other
/// slot aliases into them.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct FieldArgument {
    pub collected_arguments: Vec<NodeId>,
    pub arguments: Vec<NodeId>,
    pub assigns: Vec<NodeId>,
    pub alignment: Option<NodeId>,
    pub alignment_value: Option<u64>,
    pub sub_byte_length: Option<NodeId>,
    pub sub_byte_begin: Option<NodeId>,
    pub sub_byte_expr: Option<NodeId>,
    pub peek: Option<NodeId>,
    pub peek_value: Option<u64>,
    /// `TypeLiteral` giving the wire representation.
    pub type_map: Option<NodeId>,
    pub metadata: Vec<NodeId>,
    pub argument_mapping: FieldArgumentMapping,
    /// Set once typing has partitioned the arguments.
    pub processed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Format {
    pub ident: NodeId,
    pub belong: Option<NodeId>,
    pub body: NodeId,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub cast_fns: Vec<NodeId>,
    /// `IdentType`s naming other formats, weak.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub depends: Vec<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub state_variables: Vec<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub encode_fn: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub decode_fn: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    pub ident: NodeId,
    pub belong: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Enum {
    pub ident: NodeId,
    pub belong: Option<NodeId>,
    pub scope: Option<ScopeId>,
    pub base_type: Option<NodeId>,
    pub members: Vec<NodeId>,
    pub enum_type: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumMember {
    pub ident: NodeId,
    pub belong: Option<NodeId>,
    pub value: Option<NodeId>,
    pub str_literal: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub ident: NodeId,
    pub belong: Option<NodeId>,
    pub parameters: Vec<NodeId>,
    pub return_type: Option<NodeId>,
    pub body: NodeId,
    pub func_type: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_cast: bool,
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct IntType {
    pub bit_size: u64,
    pub is_signed: bool,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub endian: Endian,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_explicit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatType {
    pub bit_size: u64,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub endian: Endian,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_explicit: bool,
}

/// Type named by an identifier, `base` set once resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct IdentType {
    pub ident: NodeId,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub base: Option<NodeId>,
}

/// Type of an untyped integer literal, pending fitting.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct IntLiteralType {
    pub base: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct StrLiteralType {
    pub base: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct RegexLiteralType {
    pub base: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayType {
    pub element_type: NodeId,
    /// Length expression; absent for a dynamic `[]T`.
    pub length: Option<NodeId>,
    /// Folded length, set by typing when `length` is constant.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub length_value: Option<u64>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_explicit: bool,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub layout: TypeLayout,
}

/// Wire shape of a composite type, filled in after typing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct TypeLayout {
    /// Size in bits, when every value of the type has the same size.
    pub bit_size: Option<u64>,
    pub bit_alignment: BitAlignment,
    /// Decoding a value never needs a growable buffer.
    pub non_dynamic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionType {
    pub return_type: Option<NodeId>,
    pub parameters: Vec<NodeId>,
}

/// Structural type of a block: its fields, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct StructType {
    pub fields: Vec<NodeId>,
    /// `Format`, `State`, `Program` or block the struct describes, weak.
    pub base: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub recursive: bool,
    /// Wire type override from `config.type`, weak.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub type_map: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub layout: TypeLayout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct StructUnionType {
    pub cond: Option<NodeId>,
    pub conds: Vec<NodeId>,
    pub structs: Vec<NodeId>,
    pub base: Option<NodeId>,
    pub union_fields: Vec<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub exhaustive: bool,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub layout: TypeLayout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionType {
    pub cond: Option<NodeId>,
    pub candidates: Vec<NodeId>,
    pub base_type: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub common_type: Option<NodeId>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub member_candidates: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeType {
    /// Absent for the any-value ranges `..` / `..=`.
    pub base_type: Option<NodeId>,
    pub range: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumType {
    pub base: Option<NodeId>,
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::NodeType;
    crate::static_assert_size!(NodeType, 1);
}
