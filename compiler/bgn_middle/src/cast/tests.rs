use super::*;
use crate::test_helpers::{elements, right, usage};
use bgn_ir::{AstBuilder, BinaryOp, NodeType};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

fn int(bit_size: u64, is_signed: bool, endian: Endian) -> Option<Primitive> {
    Some(Primitive::Int(IntType {
        bit_size,
        is_signed,
        endian,
        is_explicit: true,
    }))
}

/// `v := <callee>(<args>)` after the pass.
fn cast_of(
    callee: &str,
    args: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>,
) -> (Ast, Result<(), LocationError>, NodeId) {
    let mut b = AstBuilder::new();
    let callee = b.ident(callee);
    let arguments = args(&mut b);
    let call = b.call(callee, arguments);
    b.define("v", BinaryOp::DefineAssign, call);
    let (mut ast, root) = b.finish();
    let result = resolve_primitive_cast(&mut ast, root);
    let value = right(&ast, elements(&ast, root)[0]);
    (ast, result, value)
}

// ============================================================================
// Type names
// ============================================================================

#[test]
fn integer_names_parse() {
    assert_eq!(Primitive::parse("u8"), int(8, false, Endian::Unspec));
    assert_eq!(Primitive::parse("s16"), int(16, true, Endian::Unspec));
    assert_eq!(Primitive::parse("ub32"), int(32, false, Endian::Big));
    assert_eq!(Primitive::parse("sl64"), int(64, true, Endian::Little));
    assert_eq!(Primitive::parse("u1"), int(1, false, Endian::Unspec));
}

#[test]
fn keyword_types_parse() {
    assert_eq!(Primitive::parse("bool"), Some(Primitive::Bool));
    assert_eq!(Primitive::parse("void"), Some(Primitive::Void));
}

#[test]
fn non_type_names_do_not_parse() {
    for name in ["u0", "u65", "u", "ub", "ux", "u08", "byte", "s-1", "U8", "f32"] {
        assert_eq!(Primitive::parse(name), None, "{name}");
    }
}

// ============================================================================
// Rewriting
// ============================================================================

#[test]
fn type_call_becomes_cast() {
    let mut arg = None;
    let (ast, result, id) = cast_of("u16", |b| {
        let x = b.ident("x");
        arg = Some(x);
        vec![x]
    });
    assert!(result.is_ok());
    let cast = ast.get::<Cast>(id).unwrap();
    assert_eq!(cast.arguments, vec![arg.unwrap()]);
    let callee = ast.get::<Call>(cast.base.unwrap()).unwrap().callee;
    assert_eq!(usage(&ast, callee), IdentUsage::ReferenceType);
    let target = ast.get::<IntType>(ast.expr_type(id).unwrap()).unwrap();
    assert_eq!((target.bit_size, target.is_signed), (16, false));
}

#[test]
fn bool_cast_targets_bool_type() {
    let (ast, result, id) = cast_of("bool", |b| vec![b.int("1")]);
    assert!(result.is_ok());
    assert_eq!(ast.node_type(ast.expr_type(id).unwrap()), NodeType::BoolType);
}

#[test]
fn nested_casts_are_both_rewritten() {
    let (ast, result, id) = cast_of("u8", |b| {
        let inner_callee = b.ident("u32");
        let x = b.ident("x");
        vec![b.call(inner_callee, vec![x])]
    });
    assert!(result.is_ok());
    let outer = ast.get::<Cast>(id).unwrap();
    assert!(ast.is::<Cast>(outer.arguments[0]));
}

#[test]
fn two_arguments_are_rejected() {
    let (ast, result, id) = cast_of("u8", |b| vec![b.int("1"), b.int("2")]);
    let err = result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2007);
    assert_eq!(err.message(), "invalid argument count for primitive cast");
    assert!(ast.is::<Call>(id));
}

#[test]
fn user_type_call_is_left_for_typing() {
    let (ast, result, id) = cast_of("Header", |b| vec![b.ident("x")]);
    assert!(result.is_ok());
    assert!(ast.is::<Call>(id));
}
