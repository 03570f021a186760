use super::*;
use crate::test_helpers::typed;
use bgn_ir::AstBuilder;
use pretty_assertions::assert_eq;

#[test]
fn constant_can_be_used_before_its_definition() {
    let (t, def) = typed(|b| {
        let x = b.ident("x");
        let one = b.int("1");
        let add = b.binary(BinaryOp::Add, x, one);
        let def = b.define("y", BinaryOp::ConstAssign, add);
        let ten = b.int("10");
        b.define("x", BinaryOp::ConstAssign, ten);
        def
    });
    let t = t.ok();
    let y = t.left(def);
    assert_eq!(t.ty(y), "u8");
    assert_eq!(t.level(y), ConstantLevel::Constant);
}

#[test]
fn reference_points_at_its_definition() {
    let (t, (def, use_)) = typed(|b| {
        let one = b.int("1");
        let def = b.define("x", BinaryOp::DefineAssign, one);
        let x = b.ident("x");
        let use_ = b.define("y", BinaryOp::DefineAssign, x);
        (def, use_)
    });
    let t = t.ok();
    let reference = t.right(use_);
    let ident = t.ast.get::<Ident>(reference).unwrap();
    assert_eq!(ident.usage, IdentUsage::Reference);
    assert_eq!(ident.base, Some(t.left(def)));
}

#[test]
fn circular_constants_are_rejected() {
    let (t, ()) = typed(|b| {
        let rhs = b.ident("b");
        b.define("a", BinaryOp::ConstAssign, rhs);
        let rhs = b.ident("a");
        b.define("b", BinaryOp::ConstAssign, rhs);
    });
    assert_eq!(t.code(), ErrorCode::E1005);
    assert!(t.err().message().starts_with("circular constant definition"));
}

#[test]
fn undefined_identifier_is_rejected() {
    let (t, ()) = typed(|b| {
        let z = b.ident("z");
        b.define("y", BinaryOp::DefineAssign, z);
    });
    assert_eq!(t.code(), ErrorCode::E1001);
    assert_eq!(t.err().message(), "identifier z is not defined");
}

#[test]
fn variable_cannot_be_used_before_its_definition() {
    let (t, ()) = typed(|b| {
        let x = b.ident("x");
        b.define("y", BinaryOp::DefineAssign, x);
        let one = b.int("1");
        b.define("x", BinaryOp::DefineAssign, one);
    });
    assert_eq!(t.code(), ErrorCode::E1001);
}

#[test]
fn function_can_be_called_before_its_definition() {
    let (t, def) = typed(|b| {
        let f = b.ident("f");
        let call = b.call(f, vec![]);
        let def = b.define("r", BinaryOp::DefineAssign, call);
        let ret = b.bool_type();
        b.function("f", &[], Some(ret), false, |_| {});
        def
    });
    let t = t.ok();
    assert_eq!(t.ty(t.left(def)), "bool");
}

#[test]
fn format_name_in_an_expression_becomes_a_type_literal() {
    let (t, def) = typed(|b| {
        b.format("Hdr", |_| {});
        let hdr = b.ident("Hdr");
        b.define("t", BinaryOp::ConstAssign, hdr)
    });
    let t = t.ok();
    let right = t.right(def);
    assert!(t.ast.is::<TypeLiteral>(right));
    assert_eq!(t.ty(right), "type");
    assert_eq!(t.level(right), ConstantLevel::Constant);
}

// ============================================================================
// Named types
// ============================================================================

fn field_of(b: &mut AstBuilder, type_name: &str) -> NodeId {
    let ty = b.ident_type(type_name);
    b.field(Some("f"), ty, vec![])
}

#[test]
fn named_type_binds_to_its_format() {
    let (t, (f, hdr)) = typed(|b| {
        let hdr = b.format("Hdr", |_| {});
        (field_of(b, "Hdr"), hdr)
    });
    let t = t.ok();
    let ty = t.ast.get::<bgn_ir::Field>(f).unwrap().field_type;
    assert_eq!(t.ast.get::<IdentType>(ty).unwrap().base, Some(hdr));
    assert_eq!(t.ty(ty), "Hdr");
}

#[test]
fn missing_type_is_rejected() {
    let (t, _) = typed(|b| field_of(b, "Nope"));
    assert_eq!(t.code(), ErrorCode::E1001);
    assert_eq!(t.err().message(), "type Nope is not defined");
}

#[test]
fn value_used_as_a_type_is_rejected() {
    let (t, _) = typed(|b| {
        let one = b.int("1");
        b.define("x", BinaryOp::ConstAssign, one);
        field_of(b, "x")
    });
    assert_eq!(t.code(), ErrorCode::E2012);
    assert_eq!(t.err().message(), "x is not a type");
}

#[test]
fn format_records_the_formats_it_depends_on() {
    let (t, (outer, inner)) = typed(|b| {
        let outer = b.format("Outer", |b| {
            field_of(b, "Inner");
        });
        let inner = b.format("Inner", |_| {});
        (outer, inner)
    });
    let t = t.ok();
    let depends = &t.ast.get::<Format>(outer).unwrap().depends;
    assert_eq!(depends.len(), 1);
    assert_eq!(t.ast.get::<IdentType>(depends[0]).unwrap().base, Some(inner));
    assert!(t.ast.get::<Format>(inner).unwrap().depends.is_empty());
}

// ============================================================================
// State Variables
// ============================================================================

#[test]
fn format_reading_a_state_field_records_it() {
    let (t, (field, plain, frame)) = typed(|b| {
        b.state("Ctx", |b| {
            let t = b.uint(8);
            b.field(Some("depth"), t, vec![]);
        });
        let ty = b.ident_type("Ctx");
        let field = b.field(Some("ctx"), ty, vec![]);
        let ty = b.uint(8);
        let plain = b.field(Some("version"), ty, vec![]);
        let frame = b.format("Frame", |b| {
            let depth = b.dotted("ctx.depth");
            b.define("seen", BinaryOp::DefineAssign, depth);
            let depth = b.dotted("ctx.depth");
            b.define("again", BinaryOp::DefineAssign, depth);
            let version = b.ident("version");
            b.define("v", BinaryOp::DefineAssign, version);
        });
        (field, plain, frame)
    });
    let t = t.ok();
    assert!(t.ast.get::<Field>(field).unwrap().is_state_variable);
    assert!(!t.ast.get::<Field>(plain).unwrap().is_state_variable);
    assert_eq!(t.ast.get::<Format>(frame).unwrap().state_variables, vec![field]);
}
