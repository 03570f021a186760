//! A comparison or logical expression standing alone as a statement is a
//! check on the decoded data.

use bgn_ir::{Assert, Ast, Binary, IndentBlock, NodeId, NodeKind, Program};

/// Wraps every boolean statement of a program or block in an [`Assert`].
/// The single statement of a match branch is the branch's value, not a
/// check, and stays as it is.
#[tracing::instrument(level = "trace", skip_all)]
pub fn replace_assert(ast: &mut Ast, root: NodeId) {
    let mut count = 0usize;
    for container in ast.descendants(root) {
        let statements = match ast.kind(container) {
            NodeKind::Program(Program { elements, .. })
            | NodeKind::IndentBlock(IndentBlock { elements, .. }) => elements.clone(),
            _ => continue,
        };
        for stmt in statements {
            let check = matches!(
                ast.kind(stmt),
                NodeKind::Binary(Binary { op, .. }) if op.is_compare() || op.is_logical()
            );
            if !check {
                continue;
            }
            let loc = ast.loc(stmt);
            let assert = ast.alloc(loc, Assert { cond: stmt });
            ast.replace_child(container, stmt, assert);
            count += 1;
        }
    }
    tracing::trace!(count, "assertions");
}
