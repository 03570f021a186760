use super::*;
use crate::IdentUsage;
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

fn ident<'a>(ast: &'a Ast, id: NodeId) -> &'a Ident {
    ast.get::<Ident>(id)
        .unwrap_or_else(|| panic!("{id:?} is not an ident"))
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn define_marks_usage_and_base() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let var = b.define("x", BinaryOp::DefineAssign, one);
    let two = b.int("2");
    let konst = b.define("K", BinaryOp::ConstAssign, two);
    let (ast, _) = b.finish();

    let var_ident = ast.get::<Binary>(var).map(|b| b.left);
    let konst_ident = ast.get::<Binary>(konst).map(|b| b.left);
    let (Some(var_ident), Some(konst_ident)) = (var_ident, konst_ident) else {
        panic!("define did not build binaries");
    };
    assert_eq!(ident(&ast, var_ident).usage, IdentUsage::DefineVariable);
    assert_eq!(ident(&ast, var_ident).base, Some(var));
    assert_eq!(ident(&ast, konst_ident).usage, IdentUsage::DefineConst);
    assert!(ident(&ast, konst_ident).scope.is_some());
}

#[test]
fn statements_land_in_program_elements() {
    let mut b = AstBuilder::new();
    let one = b.int("1");
    let def = b.define("x", BinaryOp::DefineAssign, one);
    let loose = b.int("2");
    let (ast, program) = b.finish();
    let elements = ast.get::<Program>(program).map(|p| p.elements.clone());
    assert_eq!(elements, Some(vec![def]));
    assert!(!ast.descendants(program).contains(&loose));
}

#[test]
fn format_body_describes_its_fields() {
    let mut b = AstBuilder::new();
    let mut field = None;
    let format = b.format("Header", |b| {
        let ty = b.uint(16);
        field = Some(b.field(Some("len"), ty, vec![]));
    });
    let (ast, program) = b.finish();
    let Some(field) = field else {
        panic!("body did not run");
    };

    let body = ast.get::<Format>(format).map(|f| f.body);
    let block = body.and_then(|id| ast.get::<IndentBlock>(id));
    let Some(block) = block else {
        panic!("format body is not a block");
    };
    assert_eq!(block.elements, vec![field]);
    let st = block.struct_type.and_then(|id| ast.get::<StructType>(id));
    assert_eq!(st.map(|s| s.fields.clone()), Some(vec![field]));
    assert_eq!(st.and_then(|s| s.base), Some(format));

    let f = ast.get::<Field>(field);
    assert_eq!(f.and_then(|f| f.belong), Some(format));
    assert_eq!(f.and_then(|f| f.belong_struct), block.struct_type);

    let top = ast.get::<Program>(program).and_then(|p| p.struct_type);
    let top_fields = top.and_then(|id| ast.get::<StructType>(id)).map(|s| s.fields.clone());
    assert_eq!(top_fields, Some(vec![format]));
}

#[test]
fn enum_members_belong_to_enum() {
    let mut b = AstBuilder::new();
    let base = b.uint(8);
    let one = b.int("1");
    let e = b.enum_def("Kind", Some(base), &[("A", Some(one)), ("B", None)]);
    let (ast, _) = b.finish();
    let def = ast.get::<Enum>(e).cloned();
    let Some(def) = def else {
        panic!("not an enum");
    };
    assert_eq!(def.members.len(), 2);
    for m in &def.members {
        assert_eq!(ast.get::<EnumMember>(*m).and_then(|m| m.belong), Some(e));
    }
    let et = def.enum_type.and_then(|t| ast.get::<EnumType>(t));
    assert_eq!(et.and_then(|t| t.base), Some(e));
    assert_eq!(ident(&ast, def.ident).usage, IdentUsage::DefineEnum);
}

#[test]
fn cast_function_is_recorded_on_format() {
    let mut b = AstBuilder::new();
    let mut cast = None;
    let format = b.format("Wrapped", |b| {
        let ty = b.uint(8);
        b.field(Some("v"), ty, vec![]);
        let ret = b.uint(8);
        cast = Some(b.function("u8", &[], Some(ret), true, |_| {}));
    });
    let (ast, _) = b.finish();
    let cast_fns = ast.get::<Format>(format).map(|f| f.cast_fns.clone());
    assert_eq!(cast_fns, cast.map(|c| vec![c]));
}

#[test]
fn function_parameters_become_fields() {
    let mut b = AstBuilder::new();
    let pt = b.uint(32);
    let f = b.function("add", &[("a", pt)], None, false, |_| {});
    let (ast, _) = b.finish();
    let func = ast.get::<Function>(f).cloned();
    let Some(func) = func else {
        panic!("not a function");
    };
    assert_eq!(func.parameters.len(), 1);
    let param = ast.get::<Field>(func.parameters[0]).and_then(|p| p.ident);
    let usage = param.map(|p| ident(&ast, p).usage);
    assert_eq!(usage, Some(IdentUsage::DefineArg));
    let ft = func.func_type.and_then(|t| ast.get::<FunctionType>(t));
    assert_eq!(ft.map(|t| t.parameters.clone()), Some(vec![pt]));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn match_branches_point_back_at_match() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let c1 = b.int("1");
    let c2 = b.any_range();
    let m = b.match_expr(
        Some(x),
        vec![
            Arm::new(c1, |b| b.int("10")),
            Arm::new(c2, |b| b.int("20")),
        ],
    );
    let ast = b.ast();
    let Some(def) = ast.get::<Match>(m) else {
        panic!("not a match");
    };
    assert!(!def.trial_match);
    assert_eq!(def.branches.len(), 2);
    for br in &def.branches {
        assert_eq!(ast.get::<MatchBranch>(*br).and_then(|b| b.belong), Some(m));
    }
}

#[test]
fn match_without_scrutinee_is_trial() {
    let mut b = AstBuilder::new();
    let c = b.bool_lit(true);
    let m = b.match_expr(None, vec![Arm::new(c, |b| b.int("1"))]);
    assert_eq!(b.ast().get::<Match>(m).map(|m| m.trial_match), Some(true));
}

#[test]
fn for_in_binds_loop_variable() {
    let mut b = AstBuilder::new();
    let ten = b.int("10");
    let lp = b.for_in("i", ten, |_| {});
    let (ast, _) = b.finish();
    let init = ast.get::<Loop>(lp).and_then(|l| l.init);
    let bin = init.and_then(|i| ast.get::<Binary>(i));
    let Some(bin) = bin else {
        panic!("loop has no binder");
    };
    assert_eq!(bin.op, BinaryOp::InAssign);
    assert_eq!(ident(&ast, bin.left).usage, IdentUsage::DefineVariable);
    assert_eq!(ident(&ast, bin.left).base, init);
}

// ============================================================================
// Literals and locations
// ============================================================================

#[test]
fn string_length_counts_unescaped_bytes() {
    let mut b = AstBuilder::new();
    let s = b.str_lit("a\\n");
    let lit = b.ast().get::<StrLiteral>(s);
    assert_eq!(lit.map(|l| l.value.as_str()), Some("\"a\\n\""));
    assert_eq!(lit.map(|l| l.length), Some(2));
}

#[test]
fn dotted_paths_start_at_special_literals() {
    let mut b = AstBuilder::new();
    let offset = b.dotted("input.offset");
    let ast = b.ast();
    assert_eq!(crate::config_name(ast, offset).as_deref(), Some("input.offset"));
}

#[test]
fn locations_increase_and_track_lines() {
    let mut b = AstBuilder::new();
    let a = b.int("1");
    b.newline();
    let c = b.int("2");
    let ast = b.ast();
    assert!(ast.loc(a).span.start < ast.loc(c).span.start);
    assert_eq!(ast.loc(a).line, 1);
    assert_eq!(ast.loc(c).line, 2);
    assert_eq!(ast.loc(c).col, 1);
}

#[test]
fn finish_owns_global_scope() {
    let b = AstBuilder::new();
    let (ast, program) = b.finish();
    let global = ast.get::<Program>(program).map(|p| p.global_scope);
    let Some(global) = global else {
        panic!("not a program");
    };
    assert_eq!(ast.scope(global).owner, Some(program));
}
