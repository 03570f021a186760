//! `available(ident)` becomes [`Available`].

use std::convert::Infallible;

use bgn_ir::{Ast, Available, Call, Ident, NodeId, NodeKind};

use crate::rewrite::{mark_builtin, rewrite, Rewrite};

/// Only the single-identifier form is rewritten. Anything else stays a call
/// and fails later as an undefined function.
pub fn resolve_available(ast: &mut Ast, root: NodeId) {
    match rewrite(ast, root, &mut AvailablePass) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

struct AvailablePass;

impl Rewrite for AvailablePass {
    type Error = Infallible;

    fn rewrite(&mut self, ast: &mut Ast, id: NodeId) -> Result<Option<NodeId>, Infallible> {
        let NodeKind::Call(Call { callee, arguments }) = ast.kind(id) else {
            return Ok(None);
        };
        let callee = *callee;
        let [target] = arguments.as_slice() else {
            return Ok(None);
        };
        let target = *target;
        if ast.ident_name(callee) != Some("available") || !ast.is::<Ident>(target) {
            return Ok(None);
        }
        mark_builtin(ast, callee);
        let loc = ast.loc(id);
        let available = ast.alloc(
            loc,
            Available {
                base: Some(id),
                target,
            },
        );
        let bool_type = ast.alloc(ast.loc(callee), NodeKind::BoolType);
        ast.node_mut(available).expr_type = Some(bool_type);
        Ok(Some(available))
    }
}

#[cfg(test)]
mod tests;
