//! Rendering types for diagnostics.

use crate::node::NodeKind;
use crate::{Ast, NodeId};

/// Source-like spelling of a type node.
///
/// Unknown or non-type nodes render as `<node_type>` so diagnostics stay
/// readable even for partially typed trees.
pub fn type_to_string(ast: &Ast, ty: NodeId) -> String {
    let mut out = String::new();
    write_type(ast, ty, &mut out, 0);
    out
}

fn write_type(ast: &Ast, ty: NodeId, out: &mut String, depth: usize) {
    // Formats can reach themselves through cast functions; cap the walk.
    if depth > 16 {
        out.push_str("...");
        return;
    }
    match ast.kind(ty) {
        NodeKind::IntType(t) => {
            out.push(if t.is_signed { 's' } else { 'u' });
            out.push_str(&t.bit_size.to_string());
        }
        NodeKind::FloatType(t) => {
            out.push('f');
            out.push_str(&t.bit_size.to_string());
        }
        NodeKind::BoolType => out.push_str("bool"),
        NodeKind::VoidType => out.push_str("void"),
        NodeKind::MetaType => out.push_str("type"),
        NodeKind::IntLiteralType(t) => match ast.get::<crate::IntLiteral>(t.base) {
            Some(lit) => out.push_str(&lit.value),
            None => out.push_str("int literal"),
        },
        NodeKind::StrLiteralType(t) => match ast.get::<crate::StrLiteral>(t.base) {
            Some(lit) => out.push_str(&lit.value),
            None => out.push_str("string literal"),
        },
        NodeKind::RegexLiteralType(t) => match ast.get::<crate::RegexLiteral>(t.base) {
            Some(lit) => out.push_str(&lit.value),
            None => out.push_str("regex literal"),
        },
        NodeKind::IdentType(t) => out.push_str(ast.ident_name(t.ident).unwrap_or("?")),
        NodeKind::ArrayType(t) => {
            out.push('[');
            match (t.length_value, t.length) {
                (Some(n), _) => out.push_str(&n.to_string()),
                (None, Some(_)) => out.push('?'),
                (None, None) => {}
            }
            out.push(']');
            write_type(ast, t.element_type, out, depth + 1);
        }
        NodeKind::FunctionType(t) => {
            out.push_str("fn(");
            for (i, &p) in t.parameters.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(ast, p, out, depth + 1);
            }
            out.push(')');
            if let Some(ret) = t.return_type {
                out.push_str(" -> ");
                write_type(ast, ret, out, depth + 1);
            }
        }
        NodeKind::StructType(t) => match t.base.and_then(|b| member_name(ast, b)) {
            Some(name) => out.push_str(name),
            None => out.push_str("struct"),
        },
        NodeKind::StructUnionType(_) => out.push_str("struct union"),
        NodeKind::UnionType(_) => out.push_str("union"),
        NodeKind::RangeType(t) => {
            out.push_str("range");
            if let Some(base) = t.base_type {
                out.push('<');
                write_type(ast, base, out, depth + 1);
                out.push('>');
            }
        }
        NodeKind::EnumType(t) => match t.base.and_then(|b| member_name(ast, b)) {
            Some(name) => out.push_str(name),
            None => out.push_str("enum"),
        },
        other => {
            out.push('<');
            out.push_str(&format!("{:?}", other.node_type()));
            out.push('>');
        }
    }
}

/// Declared name of a format, state or enum.
pub fn member_name(ast: &Ast, member: NodeId) -> Option<&str> {
    let ident = match ast.kind(member) {
        NodeKind::Format(f) => f.ident,
        NodeKind::State(s) => s.ident,
        NodeKind::Enum(e) => e.ident,
        NodeKind::Function(f) => f.ident,
        NodeKind::Field(f) => f.ident?,
        NodeKind::EnumMember(m) => m.ident,
        _ => return None,
    };
    ast.ident_name(ident)
}
