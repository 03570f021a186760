//! Recognition of `config.*` / `input.*` / `output.*` directives.
//!
//! Directives are ordinary member-access chains rooted at one of the three
//! special literals. They appear either assignment style
//! (`input.align = 4`) or call style (`input.subrange(8, 2)`).

use crate::node::{Binary, Call, MemberAccess, NodeKind};
use crate::ops::BinaryOp;
use crate::{Ast, NodeId};

/// Which directive spellings to accept.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ExtractMode {
    Assign,
    Call,
    Both,
}

/// A recognized directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigDesc {
    /// Dotted name, e.g. `input.align`.
    pub name: String,
    /// Right-hand side (assign style) or call arguments.
    pub arguments: Vec<NodeId>,
    pub assign_style: bool,
    /// The member-access chain naming the directive.
    pub target: NodeId,
}

/// Dotted name of a member-access chain rooted at `input`, `output` or
/// `config`; `None` for anything else.
pub fn config_name(ast: &Ast, id: NodeId) -> Option<String> {
    match ast.kind(id) {
        NodeKind::SpecialLiteral(s) => Some(s.kind.as_str().to_string()),
        NodeKind::MemberAccess(MemberAccess { target, member, .. }) => {
            let mut name = config_name(ast, *target)?;
            name.push('.');
            name.push_str(ast.ident_name(*member)?);
            Some(name)
        }
        _ => None,
    }
}

/// Dotted name of any identifier/member chain (`a.b.c`), special literals
/// included.
pub fn extract_name(ast: &Ast, id: NodeId) -> Option<String> {
    match ast.kind(id) {
        NodeKind::Ident(i) => Some(i.ident.clone()),
        NodeKind::SpecialLiteral(s) => Some(s.kind.as_str().to_string()),
        NodeKind::MemberAccess(MemberAccess { target, member, .. }) => {
            let mut name = extract_name(ast, *target)?;
            name.push('.');
            name.push_str(ast.ident_name(*member)?);
            Some(name)
        }
        _ => None,
    }
}

/// Recognize `id` as a directive.
pub fn extract_config(ast: &Ast, id: NodeId, mode: ExtractMode) -> Option<ConfigDesc> {
    match ast.kind(id) {
        NodeKind::Binary(Binary {
            op: BinaryOp::Assign,
            left,
            right,
        }) if mode != ExtractMode::Call => Some(ConfigDesc {
            name: config_name(ast, *left)?,
            arguments: vec![*right],
            assign_style: true,
            target: *left,
        }),
        NodeKind::Call(Call { callee, arguments }) if mode != ExtractMode::Assign => {
            Some(ConfigDesc {
                name: config_name(ast, *callee)?,
                arguments: arguments.clone(),
                assign_style: false,
                target: *callee,
            })
        }
        _ => None,
    }
}
