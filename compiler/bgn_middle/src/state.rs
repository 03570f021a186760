//! State variables a format needs from the formats it embeds.

use bgn_ir::{Ast, Format, IdentType, NodeId};
use rustc_hash::FxHashSet;

/// Formats `format` depends on through its field types.
fn depends(ast: &Ast, format: NodeId) -> Vec<NodeId> {
    ast.get::<Format>(format)
        .map(|f| {
            f.depends
                .iter()
                .filter_map(|&t| ast.get::<IdentType>(t).and_then(|t| t.base))
                .filter(|&b| ast.is::<Format>(b))
                .collect()
        })
        .unwrap_or_default()
}

/// Decoding a format decodes everything it embeds, so it must be handed
/// the state variables of every format it reaches. Appends those to each
/// format's own `state_variables`, first occurrence kept.
#[tracing::instrument(level = "trace", skip_all)]
pub fn resolve_state_dependency(ast: &mut Ast, root: NodeId) {
    let formats: Vec<NodeId> = ast
        .descendants(root)
        .into_iter()
        .filter(|&id| ast.is::<Format>(id))
        .collect();
    for format in formats {
        let Some(own) = ast.get::<Format>(format).map(|f| f.state_variables.clone()) else {
            continue;
        };
        let mut variables = own;
        let mut seen = FxHashSet::default();
        seen.insert(format);
        let mut stack = depends(ast, format);
        while let Some(dep) = stack.pop() {
            if !seen.insert(dep) {
                continue;
            }
            if let Some(f) = ast.get::<Format>(dep) {
                for &v in &f.state_variables {
                    if !variables.contains(&v) {
                        variables.push(v);
                    }
                }
            }
            stack.extend(depends(ast, dep));
        }
        if let Some(f) = ast.get_mut::<Format>(format) {
            if f.state_variables.len() != variables.len() {
                tracing::trace!(?format, count = variables.len(), "state variables");
            }
            f.state_variables = variables;
        }
    }
}
