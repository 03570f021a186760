use super::*;
use crate::{AstBuilder, BinaryOp, Field, Ident, IntLiteral, Paren, UnaryOp};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

fn int_value(ast: &Ast, id: NodeId) -> &str {
    ast.get::<IntLiteral>(id).map_or("", |i| i.value.as_str())
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn children_follow_slot_order() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let two = b.int("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    assert_eq!(b.ast().children(sum).as_slice(), &[one, two]);
}

#[test]
fn weak_edges_are_not_children() {
    let mut b = AstBuilder::new();
    let ty = b.uint(8);
    let field = b.field(Some("a"), ty, vec![]);
    let (ast, _) = b.finish();
    let f = ast.get::<Field>(field).cloned();
    let f = f.unwrap_or_else(|| panic!("not a field"));
    assert!(f.belong_struct.is_some());
    let children = ast.children(field);
    assert_eq!(children.len(), 2);
    assert!(!children.contains(&f.belong_struct.unwrap_or(field)));
    // the defining ident points back at the field, weakly
    let ident = f.ident.unwrap_or(field);
    assert!(ast.children(ident).is_empty());
}

#[test]
fn descendants_are_preorder() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let two = b.int("2");
    let three = b.int("3");
    let mul = b.binary(BinaryOp::Mul, two, three);
    let paren = b.paren(mul);
    let sum = b.binary(BinaryOp::Add, one, paren);
    assert_eq!(
        b.ast().descendants(sum),
        vec![sum, one, paren, mul, two, three]
    );
}

#[test]
fn descendants_handle_deep_nesting() {
    let mut b = AstBuilder::new();
    let mut node = b.int("1");
    for _ in 0..100_000 {
        node = b.unary(UnaryOp::MinusSign, node);
    }
    assert_eq!(b.ast().descendants(node).len(), 100_001);
}

#[test]
fn replace_child_rewrites_owned_slot_once() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let two = b.int("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let (mut ast, _) = b.finish();
    let three = ast.alloc(Loc::DUMMY, IntLiteral { value: "3".into() });

    assert!(ast.replace_child(sum, two, three));
    assert_eq!(ast.children(sum).as_slice(), &[one, three]);
    assert!(!ast.replace_child(sum, two, three));
}

#[test]
fn replace_child_ignores_weak_slots() {
    let mut b = AstBuilder::new();
    let ty = b.uint(8);
    let field = b.field(Some("a"), ty, vec![]);
    let (mut ast, _) = b.finish();
    let belong_struct = ast.get::<Field>(field).and_then(|f| f.belong_struct);
    let Some(belong_struct) = belong_struct else {
        panic!("field has no struct");
    };
    let other = ast.alloc(Loc::DUMMY, IntLiteral { value: "0".into() });
    assert!(!ast.replace_child(field, belong_struct, other));
}

// ============================================================================
// Deep copy
// ============================================================================

#[test]
fn deep_copy_duplicates_owned_subtree() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let two = b.int("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let (mut ast, _) = b.finish();
    let before = ast.len();

    let copy = ast.deep_copy(sum);
    assert_eq!(ast.len(), before + 3);
    assert_ne!(copy, sum);
    let kids = ast.children(copy);
    assert_eq!(kids.len(), 2);
    assert!(!kids.contains(&one) && !kids.contains(&two));
    assert_eq!(int_value(&ast, kids[0]), "1");
    assert_eq!(int_value(&ast, kids[1]), "2");
    // original untouched
    assert_eq!(ast.children(sum).as_slice(), &[one, two]);
}

#[test]
fn deep_copy_shares_weak_edges() {
    let mut b = AstBuilder::new();
    let ty = b.uint(8);
    let field = b.field(Some("a"), ty, vec![]);
    let (mut ast, _) = b.finish();
    let copy = ast.deep_copy(field);
    let original = ast.get::<Field>(field).cloned();
    let copied = ast.get::<Field>(copy).cloned();
    let (Some(original), Some(copied)) = (original, copied) else {
        panic!("copy is not a field");
    };
    assert_eq!(copied.belong_struct, original.belong_struct);
    assert_ne!(copied.ident, original.ident);
    assert_ne!(copied.field_type, original.field_type);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn unwrap_paren_strips_wrappers() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let p = b.paren(one);
    let id = b.identity(p);
    let pp = b.ast().get::<Paren>(p).map(|p| p.expr);
    assert_eq!(pp, Some(one));
    assert_eq!(b.ast().unwrap_paren(id), one);
    assert_eq!(b.ast().unwrap_paren(one), one);
}

#[test]
fn definition_ident_follows_reference_chain() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let def = b.define("x", BinaryOp::DefineAssign, one);
    let r = b.ident("x");
    let (mut ast, _) = b.finish();
    let def_ident = ast.get::<crate::Binary>(def).map(|d| d.left);
    let Some(def_ident) = def_ident else {
        panic!("define did not build a binary");
    };
    if let Some(i) = ast.get_mut::<Ident>(r) {
        i.base = Some(def_ident);
    }
    assert_eq!(ast.definition_ident(r), def_ident);
    assert_eq!(ast.ident_name(r), Some("x"));
    assert_eq!(ast.ident_name(one), None);
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn append_shifts_handles_of_the_merged_arena() {
    let mut host = AstBuilder::new();
    let one = host.int("1");
    host.define("a", BinaryOp::ConstAssign, one);
    let (mut host, _) = host.finish();
    let nodes_before = host.len();

    let mut other = AstBuilder::new();
    let two = other.int("2");
    let def = other.define("b", BinaryOp::ConstAssign, two);
    let (other, other_root) = other.finish();

    let shift = host.append(other, 3);
    let root = shift.node(other_root);
    assert_eq!(root.index(), other_root.index() + nodes_before);
    assert_eq!(host.loc(root).file, 3);

    let def = shift.node(def);
    let Some(bin) = host.get::<crate::Binary>(def) else {
        panic!("definition moved");
    };
    assert_eq!(int_value(&host, bin.right), "2");
    let Some(lhs) = host.get::<Ident>(bin.left) else {
        panic!("definition lost its identifier");
    };
    assert_eq!(lhs.base, Some(def));
    let scope = lhs.scope.map(|s| host.scope(s));
    assert_eq!(scope.map(|s| s.objects.contains(&bin.left)), Some(true));
}
