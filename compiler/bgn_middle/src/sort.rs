//! Dependency order of formats.
//!
//! Runs on a typed tree: field types must already be bound to the formats
//! they name.

use bgn_ir::{
    member_name, unescape, ArrayType, Ast, Field, Format, IdentType, IndentBlock, Metadata, NodeId,
    NodeKind, StrLiteral, StructType,
};
use rustc_hash::{FxHashMap, FxHashSet};

const ORDER_AFTER: &str = "config.order.after";

/// Topological sort of every format under a root, dependencies first.
#[derive(Default)]
pub struct FormatSorter {
    deps: FxHashMap<NodeId, Vec<NodeId>>,
    visited: FxHashSet<NodeId>,
    order: Vec<NodeId>,
}

impl FormatSorter {
    /// Formats reachable from `root`, each after the formats its fields
    /// embed.
    ///
    /// Cycles are cut where the walk first re-enters a format. A
    /// `config.order.after = "Name"` directive in a format body then moves
    /// that format directly after `Name`, in one pass over the sorted order.
    #[tracing::instrument(level = "debug", skip(ast))]
    pub fn sort(ast: &Ast, root: NodeId) -> Vec<NodeId> {
        let mut formats = Vec::new();
        let mut seen = FxHashSet::default();
        for id in ast.descendants(root) {
            if ast.is::<Format>(id) && seen.insert(id) {
                formats.push(id);
            }
        }

        let mut sorter = FormatSorter::default();
        for &format in &formats {
            let deps = dependencies(ast, format)
                .into_iter()
                .filter(|d| *d != format && seen.contains(d))
                .collect();
            sorter.deps.insert(format, deps);
        }

        let mut candidates = formats.clone();
        candidates.sort_by_key(|f| sorter.deps.get(f).map_or(0, Vec::len));
        for format in candidates {
            sorter.visit(format);
        }

        let mut order = sorter.order;
        apply_order_after(ast, &formats, &mut order);
        order
    }

    fn visit(&mut self, format: NodeId) {
        bgn_stack::ensure_sufficient_stack(|| {
            if !self.visited.insert(format) {
                return;
            }
            let deps = self.deps.get(&format).cloned().unwrap_or_default();
            for dep in deps {
                self.visit(dep);
            }
            self.order.push(format);
        });
    }
}

/// Formats embedded by the fields of `format`, nested formats excluded.
fn dependencies(ast: &Ast, format: NodeId) -> Vec<NodeId> {
    let Some(f) = ast.get::<Format>(format) else {
        return Vec::new();
    };
    let mut deps: Vec<NodeId> = f
        .depends
        .iter()
        .filter_map(|&t| ast.get::<IdentType>(t).and_then(|t| t.base))
        .filter(|&b| ast.is::<Format>(b))
        .collect();

    let mut stack = vec![f.body];
    while let Some(id) = stack.pop() {
        if let Some(field) = ast.get::<Field>(id) {
            if let Some(dep) = format_of(ast, field.field_type) {
                deps.push(dep);
            }
        }
        for child in ast.children(id) {
            if !ast.is::<Format>(child) {
                stack.push(child);
            }
        }
    }

    let mut seen = FxHashSet::default();
    deps.retain(|d| seen.insert(*d));
    deps
}

/// The format a field type stands for, looking through arrays.
fn format_of(ast: &Ast, mut ty: NodeId) -> Option<NodeId> {
    for _ in 0..ast.len() {
        match ast.kind(ty) {
            NodeKind::IdentType(IdentType { base: Some(base), .. }) => ty = *base,
            NodeKind::ArrayType(ArrayType { element_type, .. }) => ty = *element_type,
            NodeKind::StructType(StructType { base: Some(base), .. }) => ty = *base,
            NodeKind::Format(_) => return Some(ty),
            _ => return None,
        }
    }
    None
}

/// Target name of a format's `config.order.after` directive.
fn order_after(ast: &Ast, format: NodeId) -> Option<String> {
    let body = ast.get::<Format>(format)?.body;
    let block = ast.get::<IndentBlock>(body)?;
    let elements = block
        .elements
        .iter()
        .filter(|&&e| ast.is::<Metadata>(e));
    block.metadata.iter().chain(elements).find_map(|&m| {
        let meta = ast.get::<Metadata>(m)?;
        if meta.name != ORDER_AFTER {
            return None;
        }
        let literal = ast.get::<StrLiteral>(*meta.values.first()?)?;
        unescape(&literal.value).ok()
    })
}

fn apply_order_after(ast: &Ast, formats: &[NodeId], order: &mut Vec<NodeId>) {
    let by_name: FxHashMap<&str, NodeId> = formats
        .iter()
        .filter_map(|&f| Some((member_name(ast, f)?, f)))
        .collect();
    for &format in formats {
        let Some(after) = order_after(ast, format) else {
            continue;
        };
        let Some(&target) = by_name.get(after.as_str()) else {
            tracing::debug!(format = ?member_name(ast, format), %after, "order target is not a format");
            continue;
        };
        if target == format {
            continue;
        }
        let (Some(from), Some(to)) = (
            order.iter().position(|&f| f == format),
            order.iter().position(|&f| f == target),
        ) else {
            continue;
        };
        if from == to + 1 {
            continue;
        }
        order.remove(from);
        let to = if from < to { to - 1 } else { to };
        order.insert(to + 1, format);
    }
}

#[cfg(test)]
mod tests;
