use super::*;
use crate::test_helpers::{elements, right, usage};
use bgn_ir::{AstBuilder, BinaryOp, IdentUsage};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

/// `ok := available(<args>)` after the pass: the value and the callee.
fn available_of(args: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> (Ast, NodeId, NodeId) {
    let mut b = AstBuilder::new();
    let callee = b.ident("available");
    let arguments = args(&mut b);
    let call = b.call(callee, arguments);
    b.define("ok", BinaryOp::DefineAssign, call);
    let (mut ast, root) = b.finish();
    resolve_available(&mut ast, root);
    let def = elements(&ast, root)[0];
    let value = right(&ast, def);
    (ast, value, callee)
}

#[test]
fn single_identifier_becomes_available() {
    let (ast, id, callee) = available_of(|b| vec![b.ident("field")]);
    let available = ast.get::<Available>(id).unwrap();
    assert_eq!(ast.ident_name(available.target), Some("field"));
    assert!(ast.is::<Call>(available.base.unwrap()));
    let ty = ast.expr_type(id).unwrap();
    assert_eq!(ast.node_type(ty), bgn_ir::NodeType::BoolType);
    assert_eq!(usage(&ast, callee), IdentUsage::ReferenceBuiltinFn);
}

#[test]
fn member_target_stays_a_call() {
    let (ast, id, callee) = available_of(|b| vec![b.dotted("hdr.len")]);
    assert!(ast.is::<Call>(id));
    assert_eq!(usage(&ast, callee), IdentUsage::Unknown);
}

#[test]
fn two_arguments_stay_a_call() {
    let (ast, id, _) = available_of(|b| vec![b.ident("a"), b.ident("b")]);
    assert!(ast.is::<Call>(id));
}

#[test]
fn other_callee_stays_a_call() {
    let mut b = AstBuilder::new();
    let callee = b.ident("present");
    let x = b.ident("x");
    let call = b.call(callee, vec![x]);
    b.define("ok", BinaryOp::DefineAssign, call);
    let (mut ast, root) = b.finish();
    resolve_available(&mut ast, root);
    assert!(ast.is::<Call>(call));
    assert_eq!(right(&ast, elements(&ast, root)[0]), call);
}
