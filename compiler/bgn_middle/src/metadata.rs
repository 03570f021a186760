//! `config.X = v` / `config.X(args)` statements become [`Metadata`].

use bgn_ir::{extract_config, Ast, ExtractMode, IndentBlock, Metadata, NodeId, Program};

use crate::rewrite::{mark_builtin_chain, rewrite_statements};

/// Replace config directives in statement position with `Metadata` nodes and
/// record them in the enclosing block's metadata list.
///
/// Only chains rooted at `config` with at least one member count: a bare
/// `config` is left alone.
#[tracing::instrument(level = "trace", skip_all)]
pub fn replace_metadata(ast: &mut Ast, root: NodeId) {
    let replaced = rewrite_statements(ast, root, |ast, stmt| {
        let desc = extract_config(ast, stmt, ExtractMode::Both)?;
        if !desc.name.starts_with("config.") {
            return None;
        }
        mark_builtin_chain(ast, desc.target);
        let loc = ast.loc(stmt);
        Some(ast.alloc(
            loc,
            Metadata {
                base: Some(stmt),
                name: desc.name,
                values: desc.arguments,
            },
        ))
    });
    for (container, meta) in replaced {
        if let Some(p) = ast.get_mut::<Program>(container) {
            p.metadata.push(meta);
        } else if let Some(b) = ast.get_mut::<IndentBlock>(container) {
            b.metadata.push(meta);
        }
    }
}
