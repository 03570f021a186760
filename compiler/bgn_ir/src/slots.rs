//! Field descriptions for every node kind.
//!
//! # Design
//! [`NodeKind::visit_slots`] and [`NodeKind::visit_slots_mut`] report every
//! handle-valued field of a node, in declaration order, tagged with whether
//! the edge is owned or weak and which node category it must point at.
//! Traversal, in-place replacement, deep copy and interchange validation are
//! all written against this one table, so they cannot disagree about which
//! edges form the tree.

use crate::node::{NodeKind, NodeType};
use crate::{NodeId, ScopeId};

/// Ownership of an edge.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Edge {
    /// Structural child; visited by traversal.
    Owned,
    /// Lookup-only alias; never visited.
    Weak,
}

/// What a slot may point at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Expect {
    Any,
    Expr,
    Type,
    Stmt,
    Member,
    Exact(NodeType),
}

impl Expect {
    pub fn accepts(self, ty: NodeType) -> bool {
        match self {
            Expect::Any => true,
            Expect::Expr => ty.is_expr(),
            Expect::Type => ty.is_type(),
            Expect::Stmt => ty.is_stmt(),
            Expect::Member => ty.is_member(),
            Expect::Exact(want) => want == ty,
        }
    }
}

/// Description of one handle-valued field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Slot {
    pub name: &'static str,
    pub edge: Edge,
    pub expect: Expect,
}

impl Slot {
    const fn owned(name: &'static str, expect: Expect) -> Self {
        Slot {
            name,
            edge: Edge::Owned,
            expect,
        }
    }

    const fn weak(name: &'static str, expect: Expect) -> Self {
        Slot {
            name,
            edge: Edge::Weak,
            expect,
        }
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.edge == Edge::Owned
    }
}

/// Read-only slot visitor.
pub trait SlotVisitor {
    fn node(&mut self, slot: Slot, id: &NodeId);

    fn opt(&mut self, slot: Slot, id: &Option<NodeId>) {
        if let Some(id) = id {
            self.node(slot, id);
        }
    }

    fn list(&mut self, slot: Slot, ids: &[NodeId]) {
        for id in ids {
            self.node(slot, id);
        }
    }

    fn scope(&mut self, _name: &'static str, _id: &ScopeId) {}
}

/// Slot visitor that may rewrite handles in place.
pub trait SlotVisitorMut {
    fn node(&mut self, slot: Slot, id: &mut NodeId);

    fn opt(&mut self, slot: Slot, id: &mut Option<NodeId>) {
        if let Some(id) = id {
            self.node(slot, id);
        }
    }

    fn list(&mut self, slot: Slot, ids: &mut Vec<NodeId>) {
        for id in ids {
            self.node(slot, id);
        }
    }

    fn scope(&mut self, _name: &'static str, _id: &mut ScopeId) {}
}

// Shared body of `visit_slots`/`visit_slots_mut`. `$by` is `&` or `&mut`.
macro_rules! for_each_slot {
    ($kind:expr, $v:ident, $($by:tt)+) => {{
        use Expect::{Any, Exact, Expr, Member, Type};
        let o = Slot::owned;
        let w = Slot::weak;
        match $kind {
            NodeKind::Program(n) => {
                $v.opt(o("struct_type", Exact(NodeType::StructType)), $($by)+ n.struct_type);
                $v.list(o("elements", Any), $($by)+ n.elements);
                $v.scope("global_scope", $($by)+ n.global_scope);
                $v.list(w("metadata", Exact(NodeType::Metadata)), $($by)+ n.metadata);
                $v.opt(w("endian", Exact(NodeType::SpecifyOrder)), $($by)+ n.endian);
            }
            NodeKind::Binary(n) => {
                $v.node(o("left", Expr), $($by)+ n.left);
                $v.node(o("right", Expr), $($by)+ n.right);
            }
            NodeKind::Unary(n) => $v.node(o("expr", Expr), $($by)+ n.expr),
            NodeKind::Cond(n) => {
                $v.node(o("cond", Expr), $($by)+ n.cond);
                $v.node(o("then", Expr), $($by)+ n.then);
                $v.node(o("els", Expr), $($by)+ n.els);
            }
            NodeKind::Ident(n) => {
                $v.opt(w("base", Any), $($by)+ n.base);
                if let Some(scope) = $($by)+ n.scope {
                    $v.scope("scope", scope);
                }
            }
            NodeKind::Call(n) => {
                $v.node(o("callee", Expr), $($by)+ n.callee);
                $v.list(o("arguments", Expr), $($by)+ n.arguments);
            }
            NodeKind::If(n) => {
                if let Some(scope) = $($by)+ n.cond_scope {
                    $v.scope("cond_scope", scope);
                }
                $v.node(o("cond", Expr), $($by)+ n.cond);
                $v.node(o("then", Exact(NodeType::IndentBlock)), $($by)+ n.then);
                $v.opt(o("els", Any), $($by)+ n.els);
            }
            NodeKind::MemberAccess(n) => {
                $v.node(o("target", Expr), $($by)+ n.target);
                $v.node(o("member", Exact(NodeType::Ident)), $($by)+ n.member);
                $v.opt(w("base", Any), $($by)+ n.base);
            }
            NodeKind::Paren(n) => $v.node(o("expr", Expr), $($by)+ n.expr),
            NodeKind::Index(n) => {
                $v.node(o("expr", Expr), $($by)+ n.expr);
                $v.node(o("index", Expr), $($by)+ n.index);
            }
            NodeKind::Match(n) => {
                if let Some(scope) = $($by)+ n.cond_scope {
                    $v.scope("cond_scope", scope);
                }
                $v.opt(o("cond", Expr), $($by)+ n.cond);
                $v.list(o("branches", Exact(NodeType::MatchBranch)), $($by)+ n.branches);
                $v.opt(
                    o("struct_union_type", Exact(NodeType::StructUnionType)),
                    $($by)+ n.struct_union_type,
                );
            }
            NodeKind::Range(n) => {
                $v.opt(o("start", Expr), $($by)+ n.start);
                $v.opt(o("end", Expr), $($by)+ n.end);
            }
            NodeKind::Import(n) => {
                $v.node(w("base", Exact(NodeType::Call)), $($by)+ n.base);
                $v.node(o("import_desc", Exact(NodeType::Program)), $($by)+ n.import_desc);
            }
            NodeKind::Cast(n) => {
                $v.opt(w("base", Exact(NodeType::Call)), $($by)+ n.base);
                $v.list(o("arguments", Expr), $($by)+ n.arguments);
            }
            NodeKind::Available(n) => {
                $v.opt(w("base", Exact(NodeType::Call)), $($by)+ n.base);
                $v.node(o("target", Expr), $($by)+ n.target);
            }
            NodeKind::SpecifyOrder(n) => {
                $v.opt(w("base", Exact(NodeType::Binary)), $($by)+ n.base);
                $v.node(o("order", Expr), $($by)+ n.order);
            }
            NodeKind::IOOperation(n) => {
                $v.opt(w("base", Expr), $($by)+ n.base);
                $v.list(o("arguments", Expr), $($by)+ n.arguments);
            }
            NodeKind::OrCond(n) => {
                $v.opt(w("base", Exact(NodeType::Binary)), $($by)+ n.base);
                $v.list(o("cond", Expr), $($by)+ n.cond);
            }
            NodeKind::Identity(n) => $v.node(o("expr", Expr), $($by)+ n.expr),
            NodeKind::ExplicitError(n) => {
                $v.opt(w("base", Exact(NodeType::Call)), $($by)+ n.base);
                $v.node(o("message", Exact(NodeType::StrLiteral)), $($by)+ n.message);
                $v.list(o("arguments", Expr), $($by)+ n.arguments);
            }
            NodeKind::TypeLiteral(n) => $v.node(o("type_literal", Type), $($by)+ n.type_literal),
            NodeKind::Loop(n) => {
                if let Some(scope) = $($by)+ n.cond_scope {
                    $v.scope("cond_scope", scope);
                }
                $v.opt(o("init", Any), $($by)+ n.init);
                $v.opt(o("cond", Expr), $($by)+ n.cond);
                $v.opt(o("step", Any), $($by)+ n.step);
                $v.node(o("body", Exact(NodeType::IndentBlock)), $($by)+ n.body);
            }
            NodeKind::IndentBlock(n) => {
                $v.opt(o("struct_type", Exact(NodeType::StructType)), $($by)+ n.struct_type);
                $v.list(o("elements", Any), $($by)+ n.elements);
                $v.scope("scope", $($by)+ n.scope);
                $v.list(w("metadata", Exact(NodeType::Metadata)), $($by)+ n.metadata);
            }
            NodeKind::ScopedStatement(n) => {
                $v.opt(o("struct_type", Exact(NodeType::StructType)), $($by)+ n.struct_type);
                $v.node(o("statement", Any), $($by)+ n.statement);
                $v.scope("scope", $($by)+ n.scope);
            }
            NodeKind::MatchBranch(n) => {
                $v.opt(w("belong", Exact(NodeType::Match)), $($by)+ n.belong);
                $v.node(o("cond", Expr), $($by)+ n.cond);
                $v.node(o("then", Any), $($by)+ n.then);
            }
            NodeKind::UnionCandidate(n) => {
                $v.opt(w("cond", Expr), $($by)+ n.cond);
                $v.opt(w("field", Exact(NodeType::Field)), $($by)+ n.field);
            }
            NodeKind::Return(n) => {
                $v.opt(o("expr", Expr), $($by)+ n.expr);
                $v.opt(w("related_function", Exact(NodeType::Function)), $($by)+ n.related_function);
            }
            NodeKind::Assert(n) => $v.node(o("cond", Expr), $($by)+ n.cond),
            NodeKind::ImplicitYield(n) => $v.node(o("expr", Expr), $($by)+ n.expr),
            NodeKind::Metadata(n) => {
                $v.opt(w("base", Any), $($by)+ n.base);
                $v.list(o("values", Expr), $($by)+ n.values);
            }
            NodeKind::Field(n) => {
                $v.opt(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.node(o("field_type", Type), $($by)+ n.field_type);
                $v.opt(o("arguments", Exact(NodeType::FieldArgument)), $($by)+ n.arguments);
                $v.opt(w("belong", Member), $($by)+ n.belong);
                $v.opt(w("belong_struct", Exact(NodeType::StructType)), $($by)+ n.belong_struct);
            }
            NodeKind::FieldArgument(n) => {
                $v.list(o("collected_arguments", Expr), $($by)+ n.collected_arguments);
                $v.list(w("arguments", Expr), $($by)+ n.arguments);
                $v.list(w("assigns", Expr), $($by)+ n.assigns);
                $v.opt(w("alignment", Expr), $($by)+ n.alignment);
                $v.opt(w("sub_byte_length", Expr), $($by)+ n.sub_byte_length);
                $v.opt(w("sub_byte_begin", Expr), $($by)+ n.sub_byte_begin);
                $v.opt(w("sub_byte_expr", Expr), $($by)+ n.sub_byte_expr);
                $v.opt(w("peek", Expr), $($by)+ n.peek);
                $v.opt(w("type_map", Exact(NodeType::TypeLiteral)), $($by)+ n.type_map);
                $v.list(o("metadata", Exact(NodeType::Metadata)), $($by)+ n.metadata);
            }
            NodeKind::Format(n) => {
                $v.node(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.opt(w("belong", Member), $($by)+ n.belong);
                $v.node(o("body", Exact(NodeType::IndentBlock)), $($by)+ n.body);
                $v.list(w("cast_fns", Exact(NodeType::Function)), $($by)+ n.cast_fns);
                $v.list(w("depends", Exact(NodeType::IdentType)), $($by)+ n.depends);
                $v.list(w("state_variables", Exact(NodeType::Field)), $($by)+ n.state_variables);
                $v.opt(w("encode_fn", Exact(NodeType::Function)), $($by)+ n.encode_fn);
                $v.opt(w("decode_fn", Exact(NodeType::Function)), $($by)+ n.decode_fn);
            }
            NodeKind::State(n) => {
                $v.node(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.opt(w("belong", Member), $($by)+ n.belong);
                $v.node(o("body", Exact(NodeType::IndentBlock)), $($by)+ n.body);
            }
            NodeKind::Enum(n) => {
                $v.node(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.opt(w("belong", Member), $($by)+ n.belong);
                if let Some(scope) = $($by)+ n.scope {
                    $v.scope("scope", scope);
                }
                $v.opt(o("base_type", Type), $($by)+ n.base_type);
                $v.list(o("members", Exact(NodeType::EnumMember)), $($by)+ n.members);
                $v.opt(o("enum_type", Exact(NodeType::EnumType)), $($by)+ n.enum_type);
            }
            NodeKind::EnumMember(n) => {
                $v.node(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.opt(w("belong", Exact(NodeType::Enum)), $($by)+ n.belong);
                $v.opt(o("value", Expr), $($by)+ n.value);
                $v.opt(o("str_literal", Exact(NodeType::StrLiteral)), $($by)+ n.str_literal);
            }
            NodeKind::Function(n) => {
                $v.node(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.opt(w("belong", Member), $($by)+ n.belong);
                $v.list(o("parameters", Exact(NodeType::Field)), $($by)+ n.parameters);
                $v.opt(o("return_type", Type), $($by)+ n.return_type);
                $v.node(o("body", Exact(NodeType::IndentBlock)), $($by)+ n.body);
                $v.opt(o("func_type", Exact(NodeType::FunctionType)), $($by)+ n.func_type);
            }
            NodeKind::IdentType(n) => {
                $v.node(o("ident", Exact(NodeType::Ident)), $($by)+ n.ident);
                $v.opt(w("base", Member), $($by)+ n.base);
            }
            NodeKind::IntLiteralType(n) => {
                $v.node(w("base", Exact(NodeType::IntLiteral)), $($by)+ n.base);
            }
            NodeKind::StrLiteralType(n) => {
                $v.node(w("base", Exact(NodeType::StrLiteral)), $($by)+ n.base);
            }
            NodeKind::RegexLiteralType(n) => {
                $v.node(w("base", Exact(NodeType::RegexLiteral)), $($by)+ n.base);
            }
            NodeKind::ArrayType(n) => {
                $v.node(o("element_type", Type), $($by)+ n.element_type);
                $v.opt(o("length", Expr), $($by)+ n.length);
            }
            NodeKind::FunctionType(n) => {
                $v.opt(w("return_type", Type), $($by)+ n.return_type);
                $v.list(w("parameters", Type), $($by)+ n.parameters);
            }
            NodeKind::StructType(n) => {
                $v.list(w("fields", Member), $($by)+ n.fields);
                $v.opt(w("base", Any), $($by)+ n.base);
                $v.opt(w("type_map", Exact(NodeType::TypeLiteral)), $($by)+ n.type_map);
            }
            NodeKind::StructUnionType(n) => {
                $v.opt(w("cond", Expr), $($by)+ n.cond);
                $v.list(w("conds", Expr), $($by)+ n.conds);
                $v.list(o("structs", Exact(NodeType::StructType)), $($by)+ n.structs);
                $v.opt(w("base", Any), $($by)+ n.base);
                $v.list(w("union_fields", Exact(NodeType::Field)), $($by)+ n.union_fields);
            }
            NodeKind::UnionType(n) => {
                $v.opt(w("cond", Expr), $($by)+ n.cond);
                $v.list(o("candidates", Exact(NodeType::UnionCandidate)), $($by)+ n.candidates);
                $v.opt(w("base_type", Exact(NodeType::StructUnionType)), $($by)+ n.base_type);
                $v.opt(w("common_type", Type), $($by)+ n.common_type);
                $v.list(
                    w("member_candidates", Exact(NodeType::UnionCandidate)),
                    $($by)+ n.member_candidates,
                );
            }
            NodeKind::RangeType(n) => {
                $v.opt(w("base_type", Type), $($by)+ n.base_type);
                $v.opt(w("range", Exact(NodeType::Range)), $($by)+ n.range);
            }
            NodeKind::EnumType(n) => $v.opt(w("base", Exact(NodeType::Enum)), $($by)+ n.base),
            NodeKind::TmpVar(_)
            | NodeKind::IntLiteral(_)
            | NodeKind::BoolLiteral(_)
            | NodeKind::StrLiteral(_)
            | NodeKind::CharLiteral(_)
            | NodeKind::RegexLiteral(_)
            | NodeKind::SpecialLiteral(_)
            | NodeKind::IntType(_)
            | NodeKind::FloatType(_)
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::VoidType
            | NodeKind::BoolType
            | NodeKind::MetaType => {}
        }
    }};
}

impl NodeKind {
    /// Report every handle-valued field to `v`.
    pub fn visit_slots(&self, v: &mut impl SlotVisitor) {
        for_each_slot!(self, v, &);
    }

    /// Report every handle-valued field to `v`, lending it mutably.
    pub fn visit_slots_mut(&mut self, v: &mut impl SlotVisitorMut) {
        for_each_slot!(self, v, &mut);
    }
}
