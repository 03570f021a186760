use super::*;
use crate::replace_metadata;
use bgn_ir::{AstBuilder, BinaryOp};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

/// Formats built by a test, with every named field type still to bind.
#[derive(Default)]
struct Formats {
    ids: FxHashMap<&'static str, NodeId>,
    /// `(IdentType, format name)`
    refs: Vec<(NodeId, &'static str)>,
}

impl Formats {
    fn format(&mut self, b: &mut AstBuilder, name: &'static str, fields: &[&'static str]) -> NodeId {
        let mut refs = Vec::new();
        let id = b.format(name, |b| {
            for &dep in fields {
                let ty = b.ident_type(dep);
                refs.push((ty, dep));
                b.field(None, ty, vec![]);
            }
            let ty = b.uint(8);
            b.field(Some("tag"), ty, vec![]);
        });
        self.refs.extend(refs);
        self.ids.insert(name, id);
        id
    }

    /// Bind named types the way typing does.
    fn bind(&self, ast: &mut Ast) {
        for &(ty, name) in &self.refs {
            let base = self.ids.get(name).copied();
            if let Some(t) = ast.get_mut::<IdentType>(ty) {
                t.base = base;
            }
        }
    }

    fn names(&self, ast: &Ast, order: &[NodeId]) -> Vec<String> {
        order
            .iter()
            .filter_map(|&f| member_name(ast, f).map(String::from))
            .collect()
    }
}

fn sorted(build: impl FnOnce(&mut AstBuilder, &mut Formats)) -> Vec<String> {
    let mut b = AstBuilder::new();
    let mut formats = Formats::default();
    build(&mut b, &mut formats);
    let (mut ast, root) = b.finish();
    formats.bind(&mut ast);
    replace_metadata(&mut ast, root);
    let order = FormatSorter::sort(&ast, root);
    formats.names(&ast, &order)
}

/// `config.order.after = "<name>"` inside a format body.
fn order_after_directive(b: &mut AstBuilder, name: &str) {
    let target = b.dotted(ORDER_AFTER);
    let value = b.str_lit(name);
    b.assign(target, BinaryOp::Assign, value);
}

// ============================================================================
// Dependencies
// ============================================================================

#[test]
fn embedded_format_comes_first() {
    let order = sorted(|b, f| {
        f.format(b, "Packet", &["Header"]);
        f.format(b, "Header", &[]);
    });
    assert_eq!(order, vec!["Header", "Packet"]);
}

#[test]
fn independent_formats_keep_source_order() {
    let order = sorted(|b, f| {
        f.format(b, "A", &[]);
        f.format(b, "B", &[]);
        f.format(b, "C", &[]);
    });
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[test]
fn dependency_chain_is_ordered() {
    let order = sorted(|b, f| {
        f.format(b, "Top", &["Mid"]);
        f.format(b, "Mid", &["Leaf"]);
        f.format(b, "Leaf", &[]);
    });
    assert_eq!(order, vec!["Leaf", "Mid", "Top"]);
}

#[test]
fn array_of_format_is_a_dependency() {
    let mut b = AstBuilder::new();
    let mut item_ty = None;
    let list = b.format("List", |b| {
        let item = b.ident_type("Item");
        item_ty = Some(item);
        let n = b.int("4");
        let arr = b.array_type(item, Some(n));
        b.field(Some("items"), arr, vec![]);
    });
    let item = b.format("Item", |b| {
        let ty = b.uint(8);
        b.field(Some("v"), ty, vec![]);
    });
    let (mut ast, root) = b.finish();
    if let Some(t) = ast.get_mut::<IdentType>(item_ty.unwrap()) {
        t.base = Some(item);
    }
    assert_eq!(FormatSorter::sort(&ast, root), vec![item, list]);
}

#[test]
fn nested_formats_are_collected() {
    let mut b = AstBuilder::new();
    let mut inner = None;
    let mut inner_ty = None;
    let outer = b.format("Outer", |b| {
        inner = Some(b.format("Inner", |b| {
            let ty = b.uint(8);
            b.field(Some("v"), ty, vec![]);
        }));
        let ty = b.ident_type("Inner");
        inner_ty = Some(ty);
        b.field(Some("inner"), ty, vec![]);
    });
    let (mut ast, root) = b.finish();
    let inner = inner.unwrap();
    if let Some(t) = ast.get_mut::<IdentType>(inner_ty.unwrap()) {
        t.base = Some(inner);
    }
    assert_eq!(FormatSorter::sort(&ast, root), vec![inner, outer]);
}

#[test]
fn cycles_are_cut_without_loss() {
    let order = sorted(|b, f| {
        f.format(b, "Ping", &["Pong"]);
        f.format(b, "Pong", &["Ping"]);
    });
    assert_eq!(order.len(), 2);
    assert!(order.contains(&"Ping".to_string()));
    assert!(order.contains(&"Pong".to_string()));
}

#[test]
fn self_reference_is_not_a_dependency() {
    let order = sorted(|b, f| {
        f.format(b, "Node", &["Node"]);
        f.format(b, "Leaf", &[]);
    });
    assert_eq!(order, vec!["Node", "Leaf"]);
}

// ============================================================================
// Ordering directives
// ============================================================================

#[test]
fn order_after_moves_format_behind_target() {
    let order = sorted(|b, f| {
        let c = b.format("C", |b| order_after_directive(b, "A"));
        f.ids.insert("C", c);
        f.format(b, "A", &[]);
        f.format(b, "B", &[]);
    });
    assert_eq!(order, vec!["A", "C", "B"]);
}

#[test]
fn order_after_already_satisfied_is_kept() {
    let order = sorted(|b, f| {
        f.format(b, "A", &[]);
        let c = b.format("B", |b| order_after_directive(b, "A"));
        f.ids.insert("B", c);
    });
    assert_eq!(order, vec!["A", "B"]);
}

#[test]
fn order_after_unknown_format_is_ignored() {
    let order = sorted(|b, f| {
        let c = b.format("C", |b| order_after_directive(b, "Missing"));
        f.ids.insert("C", c);
        f.format(b, "A", &[]);
    });
    assert_eq!(order, vec!["C", "A"]);
}
