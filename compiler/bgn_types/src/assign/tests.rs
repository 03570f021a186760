use super::*;
use crate::test_helpers::typed;
use bgn_ir::AstBuilder;
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

/// `name := u8(value)`
fn byte_var(b: &mut AstBuilder, name: &str, value: &str) -> NodeId {
    let ty = b.uint(8);
    let callee = b.type_literal(ty);
    let v = b.int(value);
    let cast = b.call(callee, vec![v]);
    b.define(name, BinaryOp::DefineAssign, cast)
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn immutable_definition_of_a_variable_is_not_constant() {
    let (t, def) = typed(|b| {
        byte_var(b, "x", "1");
        let x = b.ident("x");
        b.define("y", BinaryOp::ConstAssign, x)
    });
    let t = t.ok();
    let y = t.left(def);
    assert_eq!(t.ty(y), "u8");
    assert_eq!(t.level(y), ConstantLevel::ImmutableVariable);
}

#[test]
fn definition_statement_is_void() {
    let (t, def) = typed(|b| byte_var(b, "x", "1"));
    let t = t.ok();
    assert_eq!(t.ty(def), "void");
    assert_eq!(t.level(t.left(def)), ConstantLevel::Variable);
}

// ============================================================================
// Assignment
// ============================================================================

#[test]
fn assigning_to_a_constant_is_rejected() {
    let (t, ()) = typed(|b| {
        let one = b.int("1");
        b.define("c", BinaryOp::ConstAssign, one);
        let c = b.ident("c");
        let two = b.int("2");
        b.assign(c, BinaryOp::Assign, two);
    });
    assert_eq!(t.code(), ErrorCode::E2004);
    assert_eq!(t.err().message(), "cannot assign to c");
}

#[test]
fn assigning_to_an_undefined_name_suggests_define() {
    let (t, ()) = typed(|b| {
        let z = b.ident("z");
        let one = b.int("1");
        b.assign(z, BinaryOp::Assign, one);
    });
    assert_eq!(t.code(), ErrorCode::E1001);
    assert!(t.err().message().contains("use :="), "{}", t.err().message());
}

#[test]
fn assigned_literal_must_fit_the_target() {
    let (t, ()) = typed(|b| {
        byte_var(b, "x", "1");
        let x = b.ident("x");
        let big = b.int("300");
        b.assign(x, BinaryOp::Assign, big);
    });
    assert_eq!(t.code(), ErrorCode::E2003);
}

#[test]
fn assigning_a_different_type_is_rejected() {
    let (t, ()) = typed(|b| {
        byte_var(b, "x", "1");
        let x = b.ident("x");
        let yes = b.bool_lit(true);
        b.assign(x, BinaryOp::Assign, yes);
    });
    assert_eq!(t.code(), ErrorCode::E2001);
    assert_eq!(t.err().message(), "cannot assign bool to u8");
}

#[test]
fn compound_assignment_keeps_the_target_type() {
    let (t, stmt) = typed(|b| {
        byte_var(b, "x", "1");
        let x = b.ident("x");
        let two = b.int("2");
        b.assign(x, BinaryOp::AddAssign, two)
    });
    let t = t.ok();
    assert_eq!(t.ty(stmt), "void");
    assert_eq!(t.ty(t.right(stmt)), "u8");
}

#[test]
fn compound_assignment_with_a_bool_is_rejected() {
    let (t, ()) = typed(|b| {
        byte_var(b, "x", "1");
        let x = b.ident("x");
        let yes = b.bool_lit(true);
        b.assign(x, BinaryOp::AddAssign, yes);
    });
    assert_eq!(t.code(), ErrorCode::E2002);
}

// ============================================================================
// `for in`
// ============================================================================

fn binder_of(ast: &bgn_ir::Ast, lp: NodeId) -> NodeId {
    let init = ast
        .get::<bgn_ir::Loop>(lp)
        .and_then(|l| l.init)
        .unwrap();
    ast.get::<Binary>(init).unwrap().left
}

#[test]
fn for_in_binder_types() {
    let (t, binders) = typed(|b| {
        let ten = b.int("10");
        let count = b.for_in("i", ten, |_| {});
        let s = b.str_lit("abc");
        let bytes = b.for_in("c", s, |_| {});
        let start = b.int("0");
        let end = b.int("300");
        let r = b.range(BinaryOp::RangeExclusive, Some(start), Some(end));
        let ranged = b.for_in("r", r, |_| {});
        [count, bytes, ranged].map(|lp| binder_of(b.ast(), lp))
    });
    let t = t.ok();
    assert_eq!(t.ty(binders[0]), "u8");
    assert_eq!(t.ty(binders[1]), "u8");
    assert_eq!(t.ty(binders[2]), "u16");
}

#[test]
fn for_in_over_a_bool_is_rejected() {
    let (t, ()) = typed(|b| {
        let yes = b.bool_lit(true);
        b.for_in("i", yes, |_| {});
    });
    assert_eq!(t.code(), ErrorCode::E2005);
    assert!(t.err().message().starts_with("cannot use bool"));
}

#[test]
fn for_in_over_an_open_range_is_rejected() {
    let (t, ()) = typed(|b| {
        let r = b.any_range();
        b.for_in("i", r, |_| {});
    });
    assert_eq!(t.code(), ErrorCode::E2005);
}

#[test]
fn counting_binder_is_immutable() {
    let (t, lp) = typed(|b| {
        let ten = b.int("10");
        b.for_in("i", ten, |b| {
            let i = b.ident("i");
            let three = b.int("3");
            b.assign(i, BinaryOp::Assign, three);
        })
    });
    let binder = binder_of(&t.ast, lp);
    assert_eq!(t.ast.get::<Ident>(binder).map(|i| i.usage), Some(IdentUsage::DefineConst));
    assert_eq!(t.code(), ErrorCode::E2004);
    assert_eq!(t.err().message(), "cannot assign to i");
}

#[test]
fn binder_over_a_variable_array_stays_assignable() {
    let (t, lp) = typed(|b| {
        let elem = b.uint(8);
        let four = b.int("4");
        let arr = b.array_type(elem, Some(four));
        b.field(Some("data"), arr, vec![]);
        let data = b.ident("data");
        b.define("copy", BinaryOp::DefineAssign, data);
        let copy = b.ident("copy");
        b.for_in("x", copy, |b| {
            let x = b.ident("x");
            let one = b.int("1");
            b.assign(x, BinaryOp::Assign, one);
        })
    });
    let t = t.ok();
    let binder = binder_of(&t.ast, lp);
    assert_eq!(t.ast.get::<Ident>(binder).map(|i| i.usage), Some(IdentUsage::DefineVariable));
    assert_eq!(t.ty(binder), "u8");
    assert_eq!(t.level(binder), ConstantLevel::Variable);
}

#[test]
fn binder_over_a_field_array_is_immutable() {
    let (t, lp) = typed(|b| {
        let elem = b.uint(8);
        let four = b.int("4");
        let arr = b.array_type(elem, Some(four));
        b.field(Some("data"), arr, vec![]);
        let data = b.ident("data");
        b.for_in("x", data, |_| {})
    });
    let t = t.ok();
    let binder = binder_of(&t.ast, lp);
    assert_eq!(t.ast.get::<Ident>(binder).map(|i| i.usage), Some(IdentUsage::DefineConst));
    assert_eq!(t.level(binder), ConstantLevel::ImmutableVariable);
}
