//! Shared traversals of the rewriting passes.

use bgn_ir::{Ast, IdentUsage, IndentBlock, NodeId, NodeKind, Program, ScopedStatement};

/// A bottom-up rewrite: children first, then the node itself.
pub(crate) trait Rewrite {
    type Error;

    /// Leave `id` and everything it owns untouched.
    fn skip(&self, _ast: &Ast, _id: NodeId) -> bool {
        false
    }

    /// The node to put in `id`'s place, if any.
    fn rewrite(&mut self, ast: &mut Ast, id: NodeId) -> Result<Option<NodeId>, Self::Error>;
}

/// Apply `pass` to the subtree owned by `id`. Returns what now stands in
/// `id`'s place.
pub(crate) fn rewrite<R: Rewrite>(ast: &mut Ast, id: NodeId, pass: &mut R) -> Result<NodeId, R::Error> {
    bgn_stack::ensure_sufficient_stack(|| {
        if pass.skip(ast, id) {
            return Ok(id);
        }
        for child in ast.children(id) {
            let replaced = rewrite(ast, child, pass)?;
            if replaced != child {
                ast.replace_child(id, child, replaced);
            }
        }
        Ok(pass.rewrite(ast, id)?.unwrap_or(id))
    })
}

/// Statement positions: elements of programs and blocks, and the single
/// statement of a match branch.
///
/// `f` sees every statement under `root` and may return a replacement.
/// Returns `(container, replacement)` for every rewrite made.
pub(crate) fn rewrite_statements(
    ast: &mut Ast,
    root: NodeId,
    mut f: impl FnMut(&mut Ast, NodeId) -> Option<NodeId>,
) -> Vec<(NodeId, NodeId)> {
    let mut done = Vec::new();
    for container in ast.descendants(root) {
        let statements = match ast.kind(container) {
            NodeKind::Program(Program { elements, .. })
            | NodeKind::IndentBlock(IndentBlock { elements, .. }) => elements.clone(),
            NodeKind::ScopedStatement(ScopedStatement { statement, .. }) => vec![*statement],
            _ => continue,
        };
        for old in statements {
            if let Some(new) = f(ast, old) {
                ast.replace_child(container, old, new);
                done.push((container, new));
            }
        }
    }
    done
}

/// Tag every member ident along a `a.b.c` chain as a builtin reference.
pub(crate) fn mark_builtin_chain(ast: &mut Ast, mut chain: NodeId) {
    while let NodeKind::MemberAccess(access) = ast.kind(chain) {
        let (target, member) = (access.target, access.member);
        mark_builtin(ast, member);
        chain = target;
    }
}

pub(crate) fn mark_builtin(ast: &mut Ast, ident: NodeId) {
    set_usage(ast, ident, IdentUsage::ReferenceBuiltinFn);
}

pub(crate) fn set_usage(ast: &mut Ast, ident: NodeId, usage: IdentUsage) {
    if let Some(i) = ast.get_mut::<bgn_ir::Ident>(ident) {
        i.usage = usage;
    }
}
