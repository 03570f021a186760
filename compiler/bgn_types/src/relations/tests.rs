use super::*;
use bgn_ir::{AstBuilder, IntLiteralType, Loc, StrLiteralType, UnionType};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn arena<T>(build: impl FnOnce(&mut AstBuilder) -> T) -> (Ast, T) {
    let mut b = AstBuilder::new();
    let out = build(&mut b);
    let (ast, _) = b.finish();
    (ast, out)
}

/// An integer literal carrying its untyped literal type.
fn literal(ast: &mut Ast, text: &str) -> NodeId {
    let lit = ast.alloc(
        Loc::DUMMY,
        IntLiteral {
            value: text.to_string(),
        },
    );
    let ty = ast.alloc(Loc::DUMMY, IntLiteralType { base: lit });
    ast.node_mut(lit).expr_type = Some(ty);
    lit
}

fn literal_type(ast: &mut Ast, text: &str) -> NodeId {
    let lit = literal(ast, text);
    ast.expr_type(lit).unwrap()
}

fn int(ast: &mut Ast, bit_size: u64, is_signed: bool) -> NodeId {
    ast.alloc(
        Loc::DUMMY,
        IntType {
            bit_size,
            is_signed,
            endian: Endian::Unspec,
            is_explicit: true,
        },
    )
}

// ============================================================================
// Widths
// ============================================================================

#[test]
fn aligned_bit_rounds_up_to_machine_widths() {
    let cases = [(0, 8), (1, 8), (8, 8), (9, 16), (16, 16), (17, 32), (33, 64), (64, 64)];
    for (bits, want) in cases {
        assert_eq!(aligned_bit(bits), want, "bits = {bits}");
    }
}

#[test]
fn literal_width_is_minimal() {
    let mut ast = Ast::new();
    let cases = [("0", 1), ("1", 1), ("255", 8), ("256", 9), ("0xffff", 16)];
    for (text, want) in cases {
        let ty = literal_type(&mut ast, text);
        assert_eq!(literal_bit_size(&ast, ty), Some(want), "literal {text}");
    }
}

// ============================================================================
// Equality and comparability
// ============================================================================

#[test]
fn integer_equality_includes_signedness() {
    let mut ast = Ast::new();
    let u8a = int(&mut ast, 8, false);
    let u8b = int(&mut ast, 8, false);
    let s8 = int(&mut ast, 8, true);
    let u16 = int(&mut ast, 16, false);
    assert!(equal_type(&ast, u8a, u8b));
    assert!(!equal_type(&ast, u8a, s8));
    assert!(!equal_type(&ast, u8a, u16));
}

#[test]
fn array_equality_depends_on_known_lengths() {
    let (mut ast, (fixed4, fixed5, unknown, dynamic)) = arena(|b| {
        let mk = |b: &mut AstBuilder, len: Option<&str>| {
            let elem = b.uint(8);
            let length = len.map(|l| b.int(l));
            b.array_type(elem, length)
        };
        (mk(b, Some("4")), mk(b, Some("5")), mk(b, Some("7")), mk(b, None))
    });
    for (arr, value) in [(fixed4, 4), (fixed5, 5)] {
        if let Some(a) = ast.get_mut::<ArrayType>(arr) {
            a.length_value = Some(value);
        }
    }
    assert!(!equal_type(&ast, fixed4, fixed5));
    assert!(equal_type(&ast, fixed4, unknown), "an unknown length may match");
    assert!(!equal_type(&ast, fixed4, dynamic), "fixed never equals dynamic");
}

#[test]
fn literals_compare_with_wide_enough_integers() {
    let mut ast = Ast::new();
    let u8t = int(&mut ast, 8, false);
    let small = literal_type(&mut ast, "255");
    let big = literal_type(&mut ast, "256");
    assert!(comparable_type(&ast, u8t, small));
    assert!(comparable_type(&ast, small, u8t));
    assert!(!comparable_type(&ast, u8t, big));
}

#[test]
fn byte_arrays_compare_with_string_literals_of_their_length() {
    let (mut ast, (arr, text)) = arena(|b| {
        let elem = b.uint(8);
        let len = b.int("2");
        (b.array_type(elem, Some(len)), b.str_lit("ab"))
    });
    if let Some(a) = ast.get_mut::<ArrayType>(arr) {
        a.length_value = Some(2);
    }
    let str_ty = ast.alloc(Loc::DUMMY, StrLiteralType { base: text });
    assert!(comparable_type(&ast, arr, str_ty));
    if let Some(a) = ast.get_mut::<ArrayType>(arr) {
        a.length_value = Some(3);
    }
    assert!(!comparable_type(&ast, arr, str_ty));
}

// ============================================================================
// Common type and fitting
// ============================================================================

#[test]
fn common_type_prefers_wider_then_unsigned() {
    let mut ast = Ast::new();
    let u8t = int(&mut ast, 8, false);
    let s8t = int(&mut ast, 8, true);
    let u16t = int(&mut ast, 16, false);
    let bool_t = ast.alloc(Loc::DUMMY, NodeKind::BoolType);
    let mut typing = Typing::new(&mut ast);
    assert_eq!(typing.common_type(u8t, u16t), Some(u16t));
    assert_eq!(typing.common_type(u16t, u8t), Some(u16t));
    assert_eq!(typing.common_type(s8t, u8t), Some(u8t));
    assert_eq!(typing.common_type(u8t, s8t), Some(u8t));
    assert_eq!(typing.common_type(u8t, bool_t), None);
}

#[test]
fn union_operand_uses_its_common_type() {
    let mut ast = Ast::new();
    let u8t = int(&mut ast, 8, false);
    let u16t = int(&mut ast, 16, false);
    let union = ast.alloc(
        Loc::DUMMY,
        UnionType {
            cond: None,
            candidates: Vec::new(),
            base_type: None,
            common_type: Some(u16t),
            member_candidates: Vec::new(),
        },
    );
    let open = ast.alloc(
        Loc::DUMMY,
        UnionType {
            cond: None,
            candidates: Vec::new(),
            base_type: None,
            common_type: None,
            member_candidates: Vec::new(),
        },
    );
    let mut typing = Typing::new(&mut ast);
    assert_eq!(typing.common_type(union, u8t), Some(u16t));
    assert_eq!(typing.common_type(u8t, union), Some(u16t));
    assert_eq!(typing.common_type(open, u8t), None);
}

#[test]
fn fitting_an_oversized_literal_fails() {
    let mut ast = Ast::new();
    let u8t = int(&mut ast, 8, false);
    let lit = literal(&mut ast, "300");
    let mut typing = Typing::new(&mut ast);
    let err = typing.fit_to(lit, u8t).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2003);
    assert_eq!(err.message(), "bit size 9 is too large for u8");
}

#[test]
fn fitting_a_literal_adopts_the_target_type() {
    let mut ast = Ast::new();
    let u16t = int(&mut ast, 16, false);
    let lit = literal(&mut ast, "300");
    let mut typing = Typing::new(&mut ast);
    typing.fit_to(lit, u16t).unwrap();
    assert_eq!(ast.expr_type(lit), Some(u16t));
}

#[test]
fn two_literals_fit_to_the_wider_aligned_width() {
    let mut ast = Ast::new();
    let big = literal(&mut ast, "300");
    let one = literal(&mut ast, "1");
    let mut typing = Typing::new(&mut ast);
    typing.fit(big, one).unwrap();
    assert_eq!(type_to_string(&ast, ast.expr_type(big).unwrap()), "u16");
    assert_eq!(ast.expr_type(big), ast.expr_type(one));
}

#[test]
fn materialize_rounds_a_lone_literal() {
    let mut ast = Ast::new();
    let lit = literal(&mut ast, "1000");
    let mut typing = Typing::new(&mut ast);
    let ty = typing.materialize(lit).unwrap();
    assert_eq!(type_to_string(&ast, ty), "u16");
}

proptest! {
    #[test]
    fn common_type_is_symmetric(
        a_bits in prop::sample::select(vec![8u64, 16, 32, 64]),
        b_bits in prop::sample::select(vec![8u64, 16, 32, 64]),
        a_signed: bool,
        b_signed: bool,
    ) {
        let mut ast = Ast::new();
        let a = int(&mut ast, a_bits, a_signed);
        let b = int(&mut ast, b_bits, b_signed);
        let mut typing = Typing::new(&mut ast);
        let ab = typing.common_type(a, b).unwrap();
        let ba = typing.common_type(b, a).unwrap();
        prop_assert!(equal_type(&ast, ab, ba));
    }

    #[test]
    fn literal_fits_exactly_when_it_is_representable(
        value: u64,
        bits in prop::sample::select(vec![8u64, 16, 32, 64]),
    ) {
        let mut ast = Ast::new();
        let target = int(&mut ast, bits, false);
        let lit = literal_type(&mut ast, &value.to_string());
        let representable = bits == 64 || value < (1u64 << bits);
        prop_assert_eq!(literal_fits(&ast, lit, target), representable);
    }
}
