use super::*;
use bgn_ir::{AstBuilder, Binary, EscapeError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn eval_with(
    mode: IdentMode,
    build: impl FnOnce(&mut AstBuilder) -> NodeId,
) -> Result<Value, EvalError> {
    let mut b = AstBuilder::new();
    let root = build(&mut b);
    let (ast, _) = b.finish();
    Evaluator::new(mode).eval(&ast, root)
}

fn eval(build: impl FnOnce(&mut AstBuilder) -> NodeId) -> Result<Value, EvalError> {
    eval_with(IdentMode::Resolve, build)
}

fn kind(result: Result<Value, EvalError>) -> EvalErrorKind {
    match result {
        Ok(v) => panic!("expected an error, got {v}"),
        Err(e) => e.kind,
    }
}

fn int_binary(b: &mut AstBuilder, op: BinaryOp, l: &str, r: &str) -> NodeId {
    let l = b.int(l);
    let r = b.int(r);
    b.binary(op, l, r)
}

/// Left ident of a `define`d binary.
fn defined_ident(ast: &Ast, def: NodeId) -> NodeId {
    ast.get::<Binary>(def)
        .map(|b| b.left)
        .unwrap_or_else(|| panic!("{def:?} is not a binary"))
}

fn point_at(ast: &mut Ast, reference: NodeId, target: NodeId) {
    if let Some(i) = ast.get_mut::<Ident>(reference) {
        i.base = Some(target);
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn folds_arithmetic() {
    let v = eval(|b| {
        let mul = int_binary(b, BinaryOp::Mul, "3", "4");
        let two = b.int("0x2");
        b.binary(BinaryOp::Add, mul, two)
    });
    assert_eq!(v, Ok(Value::Int(14)));
}

#[test]
fn division_and_modulo_by_zero_are_errors() {
    let div = eval(|b| int_binary(b, BinaryOp::Div, "1", "0"));
    assert_eq!(kind(div), EvalErrorKind::DivisionByZero);
    let rem = eval(|b| int_binary(b, BinaryOp::Mod, "1", "0"));
    assert_eq!(kind(rem), EvalErrorKind::ModuloByZero);
}

#[test]
fn division_is_signed() {
    let v = eval(|b| {
        let eight = b.int("8");
        let neg = b.unary(UnaryOp::MinusSign, eight);
        let two = b.int("2");
        b.binary(BinaryOp::Div, neg, two)
    });
    assert_eq!(v, Ok(Value::Int(unsigned(-4))));
}

#[test]
fn shifts_distinguish_logical_and_arithmetic() {
    let build = |op| {
        move |b: &mut AstBuilder| {
            let eight = b.int("8");
            let neg = b.unary(UnaryOp::MinusSign, eight);
            let one = b.int("1");
            b.binary(op, neg, one)
        }
    };
    assert_eq!(
        eval(build(BinaryOp::RightArithmeticShift)),
        Ok(Value::Int(unsigned(-4)))
    );
    assert_eq!(
        eval(build(BinaryOp::RightLogicalShift)),
        Ok(Value::Int(0x7FFF_FFFF_FFFF_FFFC))
    );
}

#[test]
fn oversized_shift_saturates() {
    let v = eval(|b| int_binary(b, BinaryOp::LeftLogicalShift, "1", "64"));
    assert_eq!(v, Ok(Value::Int(0)));
}

#[test]
fn comparisons_are_signed() {
    let v = eval(|b| {
        let one = b.int("1");
        let neg = b.unary(UnaryOp::MinusSign, one);
        let zero = b.int("0");
        b.binary(BinaryOp::Less, neg, zero)
    });
    assert_eq!(v, Ok(Value::Bool(true)));
}

#[test]
fn unary_not_is_logical_or_bitwise() {
    let logical = eval(|b| {
        let t = b.bool_lit(true);
        b.unary(UnaryOp::Not, t)
    });
    assert_eq!(logical, Ok(Value::Bool(false)));
    let bitwise = eval(|b| {
        let zero = b.int("0");
        b.unary(UnaryOp::Not, zero)
    });
    assert_eq!(bitwise, Ok(Value::Int(u64::MAX)));
}

#[test]
fn mixed_operands_are_rejected() {
    let v = eval(|b| {
        let one = b.int("1");
        let t = b.bool_lit(true);
        b.binary(BinaryOp::Add, one, t)
    });
    assert_eq!(
        kind(v),
        EvalErrorKind::KindMismatch {
            expected: "integer",
            found: "bool"
        }
    );
}

#[test]
fn bool_arithmetic_is_invalid() {
    let v = eval(|b| {
        let t = b.bool_lit(true);
        let f = b.bool_lit(false);
        b.binary(BinaryOp::Add, t, f)
    });
    assert_eq!(
        kind(v),
        EvalErrorKind::InvalidOperator {
            op: "+",
            operand: "bool"
        }
    );
}

// ============================================================================
// Short-circuit and conditionals
// ============================================================================

#[test]
fn logical_and_short_circuits() {
    let v = eval(|b| {
        let f = b.bool_lit(false);
        let div = int_binary(b, BinaryOp::Div, "1", "0");
        let zero = b.int("0");
        let eq = b.binary(BinaryOp::Equal, div, zero);
        b.binary(BinaryOp::LogicalAnd, f, eq)
    });
    assert_eq!(v, Ok(Value::Bool(false)));
}

#[test]
fn logical_or_short_circuits() {
    let v = eval(|b| {
        let t = b.bool_lit(true);
        let div = int_binary(b, BinaryOp::Div, "1", "0");
        let zero = b.int("0");
        let eq = b.binary(BinaryOp::Equal, div, zero);
        b.binary(BinaryOp::LogicalOr, t, eq)
    });
    assert_eq!(v, Ok(Value::Bool(true)));
}

#[test]
fn cond_evaluates_only_the_taken_branch() {
    let v = eval(|b| {
        let t = b.bool_lit(true);
        let one = b.int("1");
        let div = int_binary(b, BinaryOp::Div, "1", "0");
        b.cond(t, one, div)
    });
    assert_eq!(v, Ok(Value::Int(1)));
}

#[test]
fn cond_requires_bool() {
    let v = eval(|b| {
        let one = b.int("1");
        let two = b.int("2");
        let three = b.int("3");
        b.cond(one, two, three)
    });
    assert_eq!(
        kind(v),
        EvalErrorKind::KindMismatch {
            expected: "bool",
            found: "integer"
        }
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn string_comparison_unescapes_both_sides() {
    let v = eval(|b| {
        let escaped = b.str_lit("a\\x41");
        let plain = b.str_lit("aA");
        b.binary(BinaryOp::Equal, escaped, plain)
    });
    assert_eq!(v, Ok(Value::Bool(true)));
}

#[test]
fn bad_escape_fails_comparison() {
    let v = eval(|b| {
        let bad = b.str_lit("\\q");
        let plain = b.str_lit("q");
        b.binary(BinaryOp::NotEqual, bad, plain)
    });
    assert_eq!(kind(v), EvalErrorKind::Unescape(EscapeError::Unknown('q')));
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn ident_modes() {
    let build = |b: &mut AstBuilder| b.ident("SIZE");
    assert_eq!(
        eval_with(IdentMode::Raw, build),
        Ok(Value::Ident("SIZE".into()))
    );
    assert_eq!(
        kind(eval_with(IdentMode::None, build)),
        EvalErrorKind::IdentNotAllowed("SIZE".into())
    );
    assert_eq!(
        kind(eval_with(IdentMode::Resolve, build)),
        EvalErrorKind::NotConstant("SIZE".into())
    );
}

#[test]
fn resolves_constant_through_reference() {
    let mut b = AstBuilder::new();
    let ten = b.int("10");
    let def = b.define("SIZE", BinaryOp::ConstAssign, ten);
    let reference = b.ident("SIZE");
    let two = b.int("2");
    let mul = b.binary(BinaryOp::Mul, reference, two);
    let (mut ast, _) = b.finish();
    let def_ident = defined_ident(&ast, def);
    point_at(&mut ast, reference, def_ident);

    let ev = Evaluator::resolve_ident();
    assert_eq!(ev.eval(&ast, def_ident), Ok(Value::Int(10)));
    assert_eq!(ev.eval(&ast, mul), Ok(Value::Int(20)));
}

#[test]
fn variables_are_not_constant() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let def = b.define("x", BinaryOp::DefineAssign, one);
    let (ast, _) = b.finish();
    let ident = defined_ident(&ast, def);
    assert_eq!(
        kind(Evaluator::resolve_ident().eval(&ast, ident)),
        EvalErrorKind::NotConstant("x".into())
    );
}

#[test]
fn circular_constants_are_reported() {
    let mut b = AstBuilder::new();
    let ref_b = b.ident("B");
    let def_a = b.define("A", BinaryOp::ConstAssign, ref_b);
    let ref_a = b.ident("A");
    let def_b = b.define("B", BinaryOp::ConstAssign, ref_a);
    let (mut ast, _) = b.finish();
    let a = defined_ident(&ast, def_a);
    let bb = defined_ident(&ast, def_b);
    point_at(&mut ast, ref_a, a);
    point_at(&mut ast, ref_b, bb);

    let err = kind(Evaluator::resolve_ident().eval(&ast, a));
    assert!(matches!(err, EvalErrorKind::Recursive(_)), "{err:?}");
}

#[test]
fn enum_members_continue_from_previous() {
    let mut b = AstBuilder::new();
    let five = b.int("5");
    let e = b.enum_def("Kind", None, &[("A", Some(five)), ("B", None), ("C", None)]);
    let reference = b.ident("C");
    let (mut ast, _) = b.finish();
    let members = ast
        .get::<bgn_ir::Enum>(e)
        .map(|e| e.members.clone())
        .unwrap_or_default();
    let c_ident = ast
        .get::<EnumMember>(members[2])
        .map(|m| m.ident)
        .unwrap_or_else(|| panic!("member missing"));
    point_at(&mut ast, reference, c_ident);

    assert_eq!(
        Evaluator::resolve_ident().eval(&ast, reference),
        Ok(Value::Int(7))
    );
}

#[test]
fn first_implicit_member_is_zero() {
    let mut b = AstBuilder::new();
    let e = b.enum_def("Flag", None, &[("OFF", None), ("ON", None)]);
    let (ast, _) = b.finish();
    let members = ast
        .get::<bgn_ir::Enum>(e)
        .map(|e| e.members.clone())
        .unwrap_or_default();
    let ev = Evaluator::resolve_ident();
    let on_ident = ast
        .get::<EnumMember>(members[1])
        .map(|m| m.ident)
        .unwrap_or_else(|| panic!("member missing"));
    assert_eq!(ev.eval(&ast, on_ident), Ok(Value::Int(1)));
}

// ============================================================================
// Directives and placeholders
// ============================================================================

#[test]
fn config_flags_have_fixed_values() {
    let v = |path: &'static str| eval(move |b| b.dotted(path));
    assert_eq!(v("config.endian.big"), Ok(Value::Int(0)));
    assert_eq!(v("config.endian.little"), Ok(Value::Int(1)));
    assert_eq!(v("config.endian.native"), Ok(Value::Int(2)));
    assert_eq!(v("config.bit_order.msb"), Ok(Value::Int(1)));
}

#[test]
fn unbound_placeholder_is_unsupported() {
    let mut ast = Ast::new();
    let tmp = ast.alloc(bgn_ir::Loc::default(), bgn_ir::TmpVar { tmp_var: 3 });
    assert_eq!(
        kind(Evaluator::default().eval(&ast, tmp)),
        EvalErrorKind::Unsupported(bgn_ir::NodeType::TmpVar)
    );
    let bound = Evaluator::default().with_tmp(3, Value::Int(9));
    assert_eq!(bound.eval(&ast, tmp), Ok(Value::Int(9)));
}

#[test]
fn calls_are_unsupported() {
    let v = eval(|b| {
        let callee = b.ident("f");
        b.call(callee, vec![])
    });
    assert_eq!(
        kind(v),
        EvalErrorKind::Unsupported(bgn_ir::NodeType::Call)
    );
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn addition_matches_wrapping_add(a in any::<u64>(), c in any::<u64>()) {
        let v = eval(|b| int_binary(b, BinaryOp::Add, &a.to_string(), &c.to_string()));
        prop_assert_eq!(v, Ok(Value::Int(a.wrapping_add(c))));
    }

    #[test]
    fn any_division_by_zero_fails(a in any::<u64>()) {
        let v = eval(|b| int_binary(b, BinaryOp::Div, &a.to_string(), "0"));
        prop_assert_eq!(v.map_err(|e| e.kind), Err(EvalErrorKind::DivisionByZero));
    }
}
