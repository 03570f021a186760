//! Builtin I/O directives become [`IOOperation`].
//!
//! Bare members (`input.offset`, `config.endian.big`) and calls
//! (`input.get(u8)`, `output.put(x)`) are recognized by their dotted name.
//! Field arguments are left as written; field typing reads them itself.

use std::convert::Infallible;

use bgn_ir::{config_name, Ast, Call, IOMethod, IOOperation, MemberAccess, NodeId, NodeKind, NodeType};

use crate::rewrite::{mark_builtin, rewrite, Rewrite};

pub fn resolve_io_operation(ast: &mut Ast, root: NodeId) {
    match rewrite(ast, root, &mut IoPass) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

struct IoPass;

impl Rewrite for IoPass {
    type Error = Infallible;

    fn skip(&self, ast: &Ast, id: NodeId) -> bool {
        matches!(
            ast.node_type(id),
            NodeType::FieldArgument | NodeType::IOOperation
        )
    }

    fn rewrite(&mut self, ast: &mut Ast, id: NodeId) -> Result<Option<NodeId>, Infallible> {
        let (method, access, arguments) = match ast.kind(id) {
            NodeKind::MemberAccess(_) => {
                let Some(method) = config_name(ast, id).and_then(|n| IOMethod::from_member_name(&n))
                else {
                    return Ok(None);
                };
                (method, id, Vec::new())
            }
            NodeKind::Call(Call { callee, arguments }) => {
                let Some(method) =
                    config_name(ast, *callee).and_then(|n| IOMethod::from_call_name(&n))
                else {
                    return Ok(None);
                };
                (method, *callee, arguments.clone())
            }
            _ => return Ok(None),
        };
        let Some((target, member)) = ast.get::<MemberAccess>(access).map(|m| (m.target, m.member))
        else {
            return Ok(None);
        };
        mark_builtin(ast, member);
        if method.is_config_flag() {
            // `config.endian` in `config.endian.big`
            if let Some(inner) = ast.get::<MemberAccess>(target).map(|m| m.member) {
                mark_builtin(ast, inner);
            }
        }
        tracing::trace!(?id, method = method.as_name(), "io operation");
        let loc = ast.loc(id);
        Ok(Some(ast.alloc(
            loc,
            IOOperation {
                base: Some(id),
                method,
                arguments,
            },
        )))
    }
}
