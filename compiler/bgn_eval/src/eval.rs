//! The constant evaluator.
//!
//! # Design
//! Evaluation is a pure function of the arena: it reads nodes, never writes
//! them. Identifier handling is an explicit [`IdentMode`] rather than
//! context-dependent guessing, because the same expression can be a
//! required constant in one caller and a name to extract in another.
//!
//! Integers are 64-bit two's complement: `+ - *` wrap, `/ %` and the
//! comparisons are signed, logical shifts work on the unsigned
//! representation. Division and modulo by zero are errors, never traps.

use std::cmp::Ordering;

use bgn_ir::{
    config_name, unescape, Ast, BinaryOp, Cond, EnumMember, IOMethod, Ident, IntType, NodeId,
    NodeKind, UnaryOp,
};
use rustc_hash::FxHashMap;

use crate::error::{EvalError, EvalErrorKind};
use crate::value::{parse_int_literal, Value};

/// Nesting limit for resolving constants through other constants.
const MAX_RESOLVE_DEPTH: usize = 64;

/// How identifiers are evaluated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum IdentMode {
    /// Yield the identifier's name as [`Value::Ident`].
    Raw,
    /// Fold through constant (`::=`) and enum member definitions.
    #[default]
    Resolve,
    /// Any identifier is an error.
    None,
}

/// Constant expression evaluator.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    mode: IdentMode,
    tmp_values: FxHashMap<u64, Value>,
}

impl Evaluator {
    pub fn new(mode: IdentMode) -> Self {
        Evaluator {
            mode,
            tmp_values: FxHashMap::default(),
        }
    }

    pub fn raw_ident() -> Self {
        Self::new(IdentMode::Raw)
    }

    pub fn resolve_ident() -> Self {
        Self::new(IdentMode::Resolve)
    }

    pub fn no_ident() -> Self {
        Self::new(IdentMode::None)
    }

    pub fn mode(&self) -> IdentMode {
        self.mode
    }

    /// Give the placeholder `TmpVar(tmp)` a value.
    #[must_use]
    pub fn with_tmp(mut self, tmp: u64, value: Value) -> Self {
        self.tmp_values.insert(tmp, value);
        self
    }

    /// Evaluate `id`.
    pub fn eval(&self, ast: &Ast, id: NodeId) -> Result<Value, EvalError> {
        self.eval_at(ast, id, 0)
    }

    /// Evaluate `id`, requiring an integer.
    pub fn eval_int(&self, ast: &Ast, id: NodeId) -> Result<u64, EvalError> {
        match self.eval(ast, id)? {
            Value::Int(v) => Ok(v),
            other => Err(mismatch(ast, id, "integer", &other)),
        }
    }

    /// Evaluate `id`, requiring a boolean.
    pub fn eval_bool(&self, ast: &Ast, id: NodeId) -> Result<bool, EvalError> {
        match self.eval(ast, id)? {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(ast, id, "bool", &other)),
        }
    }

    #[tracing::instrument(level = "trace", skip(self, ast), fields(node = ?id))]
    fn eval_at(&self, ast: &Ast, id: NodeId, depth: usize) -> Result<Value, EvalError> {
        bgn_stack::ensure_sufficient_stack(|| self.eval_node(ast, id, depth))
    }

    fn eval_node(&self, ast: &Ast, id: NodeId, depth: usize) -> Result<Value, EvalError> {
        let loc = ast.loc(id);
        match ast.kind(id) {
            NodeKind::IntLiteral(lit) => parse_int_literal(&lit.value)
                .map(Value::Int)
                .ok_or_else(|| EvalError::new(loc, EvalErrorKind::BadIntLiteral(lit.value.clone()))),
            NodeKind::BoolLiteral(lit) => Ok(Value::Bool(lit.value)),
            NodeKind::StrLiteral(lit) => Ok(Value::Str(lit.value.clone())),
            NodeKind::CharLiteral(lit) => Ok(Value::Int(lit.code)),
            NodeKind::Paren(p) => self.eval_at(ast, p.expr, depth),
            NodeKind::Identity(i) => self.eval_at(ast, i.expr, depth),
            NodeKind::TmpVar(t) => self
                .tmp_values
                .get(&t.tmp_var)
                .cloned()
                .ok_or_else(|| EvalError::new(loc, EvalErrorKind::Unsupported(ast.node_type(id)))),
            NodeKind::Unary(u) => {
                let v = self.eval_at(ast, u.expr, depth)?;
                eval_unary(u.op, v).map_err(|kind| EvalError::new(loc, kind))
            }
            NodeKind::Binary(b) => self.eval_binary(ast, id, b.op, b.left, b.right, depth),
            NodeKind::Cond(c) => self.eval_cond(ast, c, depth),
            NodeKind::Ident(ident) => self.eval_ident(ast, id, ident, depth),
            NodeKind::MemberAccess(ma) => {
                if let Some(flag) = config_name(ast, id).as_deref().and_then(config_flag) {
                    return Ok(Value::Int(flag));
                }
                match (self.mode, ma.base) {
                    (IdentMode::Resolve, Some(base)) => self.eval_definition(ast, id, base, depth),
                    _ => Err(EvalError::new(loc, EvalErrorKind::Unsupported(ast.node_type(id)))),
                }
            }
            NodeKind::IOOperation(io) if io.method.is_config_flag() => {
                config_flag(io.method.as_name())
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::new(loc, EvalErrorKind::Unsupported(ast.node_type(id))))
            }
            NodeKind::Cast(cast) => {
                let target = ast.expr_type(id).and_then(|t| ast.get::<IntType>(t));
                match (target, cast.arguments.as_slice()) {
                    (Some(_), []) => Ok(Value::Int(0)),
                    (Some(int), [arg]) => {
                        let v = self.eval_at(ast, *arg, depth)?;
                        match v {
                            Value::Int(v) => Ok(Value::Int(truncate(v, int))),
                            Value::Bool(b) => Ok(Value::Int(u64::from(b))),
                            other => Err(mismatch(ast, *arg, "integer", &other)),
                        }
                    }
                    _ => Err(EvalError::new(loc, EvalErrorKind::Unsupported(ast.node_type(id)))),
                }
            }
            _ => Err(EvalError::new(loc, EvalErrorKind::Unsupported(ast.node_type(id)))),
        }
    }

    fn eval_binary(
        &self,
        ast: &Ast,
        id: NodeId,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
        depth: usize,
    ) -> Result<Value, EvalError> {
        let loc = ast.loc(id);
        if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) {
            let l = self.eval_at(ast, left, depth)?;
            let Value::Bool(l) = l else {
                return Err(mismatch(ast, left, "bool", &l));
            };
            // short-circuit
            if (op == BinaryOp::LogicalAnd && !l) || (op == BinaryOp::LogicalOr && l) {
                return Ok(Value::Bool(l));
            }
            let r = self.eval_at(ast, right, depth)?;
            return match r {
                Value::Bool(r) => Ok(Value::Bool(r)),
                other => Err(mismatch(ast, right, "bool", &other)),
            };
        }
        let l = self.eval_at(ast, left, depth)?;
        let r = self.eval_at(ast, right, depth)?;
        eval_binary_values(op, l, r).map_err(|kind| EvalError::new(loc, kind))
    }

    fn eval_cond(&self, ast: &Ast, c: &Cond, depth: usize) -> Result<Value, EvalError> {
        let cond = self.eval_at(ast, c.cond, depth)?;
        match cond {
            Value::Bool(true) => self.eval_at(ast, c.then, depth),
            Value::Bool(false) => self.eval_at(ast, c.els, depth),
            other => Err(mismatch(ast, c.cond, "bool", &other)),
        }
    }

    fn eval_ident(
        &self,
        ast: &Ast,
        id: NodeId,
        ident: &Ident,
        depth: usize,
    ) -> Result<Value, EvalError> {
        let loc = ast.loc(id);
        match self.mode {
            IdentMode::Raw => Ok(Value::Ident(ident.ident.clone())),
            IdentMode::None => Err(EvalError::new(
                loc,
                EvalErrorKind::IdentNotAllowed(ident.ident.clone()),
            )),
            IdentMode::Resolve => {
                let def = ast.definition_ident(id);
                match ast.get::<Ident>(def).and_then(|d| d.base) {
                    Some(base) => self.eval_definition(ast, id, base, depth),
                    None => Err(EvalError::new(
                        loc,
                        EvalErrorKind::NotConstant(ident.ident.clone()),
                    )),
                }
            }
        }
    }

    /// Value of the definition `base` that the reference `at` resolved to.
    fn eval_definition(
        &self,
        ast: &Ast,
        at: NodeId,
        base: NodeId,
        depth: usize,
    ) -> Result<Value, EvalError> {
        let loc = ast.loc(at);
        let name = || display_name(ast, at);
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(EvalError::new(loc, EvalErrorKind::Recursive(name())));
        }
        match ast.kind(base) {
            NodeKind::Binary(b) if b.op == BinaryOp::ConstAssign => {
                self.eval_at(ast, b.right, depth + 1)
            }
            NodeKind::EnumMember(_) => self.eval_enum_member(ast, base, depth + 1),
            NodeKind::Ident(_) => {
                let def = ast.definition_ident(base);
                match ast.get::<Ident>(def).and_then(|d| d.base) {
                    Some(next) if next != base => self.eval_definition(ast, at, next, depth + 1),
                    _ => Err(EvalError::new(loc, EvalErrorKind::NotConstant(name()))),
                }
            }
            _ => Err(EvalError::new(loc, EvalErrorKind::NotConstant(name()))),
        }
    }

    /// Enum members without an explicit value continue from the previous
    /// member, starting at 0.
    fn eval_enum_member(&self, ast: &Ast, member: NodeId, depth: usize) -> Result<Value, EvalError> {
        let Some(m) = ast.get::<EnumMember>(member) else {
            return Err(EvalError::new(
                ast.loc(member),
                EvalErrorKind::Unsupported(ast.node_type(member)),
            ));
        };
        if let Some(value) = m.value {
            return self.eval_at(ast, value, depth);
        }
        let siblings = m
            .belong
            .and_then(|e| ast.get::<bgn_ir::Enum>(e))
            .map(|e| e.members.as_slice())
            .unwrap_or_default();
        let mut current: Option<u64> = None;
        for &sibling in siblings {
            let explicit = ast.get::<EnumMember>(sibling).and_then(|s| s.value);
            let next = match explicit {
                Some(value) => self.eval_at(ast, value, depth)?,
                None => Value::Int(current.map_or(0, |c| c.wrapping_add(1))),
            };
            let Value::Int(n) = next else {
                return Err(mismatch(ast, sibling, "integer", &next));
            };
            if sibling == member {
                return Ok(Value::Int(n));
            }
            current = Some(n);
        }
        Ok(Value::Int(0))
    }
}

// ============================================================================
// Operators
// ============================================================================

#[allow(clippy::cast_possible_wrap)]
fn signed(v: u64) -> i64 {
    v as i64
}

#[allow(clippy::cast_sign_loss)]
fn unsigned(v: i64) -> u64 {
    v as u64
}

fn shift_amount(b: u64) -> Option<u32> {
    u32::try_from(b).ok()
}

fn eval_unary(op: UnaryOp, v: Value) -> Result<Value, EvalErrorKind> {
    match (op, v) {
        (UnaryOp::MinusSign, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
        (UnaryOp::Not, Value::Int(v)) => Ok(Value::Int(!v)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, v) => Err(EvalErrorKind::InvalidOperator {
            op: op.as_symbol(),
            operand: v.kind_name(),
        }),
    }
}

fn eval_binary_values(op: BinaryOp, l: Value, r: Value) -> Result<Value, EvalErrorKind> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(op, a, b),
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::Equal => Ok(Value::Bool(a == b)),
            BinaryOp::NotEqual => Ok(Value::Bool(a != b)),
            _ => Err(EvalErrorKind::InvalidOperator {
                op: op.as_symbol(),
                operand: "bool",
            }),
        },
        (Value::Str(a), Value::Str(b)) if op.is_compare() => {
            let a = unescape(&a)?;
            let b = unescape(&b)?;
            Ok(Value::Bool(compare(op, a.cmp(&b))))
        }
        (_, r) if op == BinaryOp::Comma => Ok(r),
        (l, r) if l.kind_name() == r.kind_name() => Err(EvalErrorKind::InvalidOperator {
            op: op.as_symbol(),
            operand: l.kind_name(),
        }),
        (l, r) => Err(EvalErrorKind::KindMismatch {
            expected: l.kind_name(),
            found: r.kind_name(),
        }),
    }
}

fn eval_int_binary(op: BinaryOp, a: u64, b: u64) -> Result<Value, EvalErrorKind> {
    let int = |v: u64| Ok(Value::Int(v));
    match op {
        BinaryOp::Add => int(a.wrapping_add(b)),
        BinaryOp::Sub => int(a.wrapping_sub(b)),
        BinaryOp::Mul => int(a.wrapping_mul(b)),
        BinaryOp::Div if b == 0 => Err(EvalErrorKind::DivisionByZero),
        BinaryOp::Div => int(unsigned(signed(a).wrapping_div(signed(b)))),
        BinaryOp::Mod if b == 0 => Err(EvalErrorKind::ModuloByZero),
        BinaryOp::Mod => int(unsigned(signed(a).wrapping_rem(signed(b)))),
        BinaryOp::BitAnd => int(a & b),
        BinaryOp::BitOr => int(a | b),
        BinaryOp::BitXor => int(a ^ b),
        BinaryOp::LeftLogicalShift | BinaryOp::LeftArithmeticShift => {
            int(shift_amount(b).and_then(|s| a.checked_shl(s)).unwrap_or(0))
        }
        BinaryOp::RightLogicalShift => {
            int(shift_amount(b).and_then(|s| a.checked_shr(s)).unwrap_or(0))
        }
        BinaryOp::RightArithmeticShift => {
            let a = signed(a);
            let fill = if a < 0 { -1 } else { 0 };
            int(unsigned(
                shift_amount(b).and_then(|s| a.checked_shr(s)).unwrap_or(fill),
            ))
        }
        BinaryOp::Comma => int(b),
        op if op.is_compare() => Ok(Value::Bool(compare(op, signed(a).cmp(&signed(b))))),
        op => Err(EvalErrorKind::InvalidOperator {
            op: op.as_symbol(),
            operand: "integer",
        }),
    }
}

fn compare(op: BinaryOp, ord: Ordering) -> bool {
    match op {
        BinaryOp::Equal => ord == Ordering::Equal,
        BinaryOp::NotEqual => ord != Ordering::Equal,
        BinaryOp::Less => ord == Ordering::Less,
        BinaryOp::LessOrEq => ord != Ordering::Greater,
        BinaryOp::Greater => ord == Ordering::Greater,
        BinaryOp::GreaterOrEq => ord != Ordering::Less,
        _ => false,
    }
}

/// Fixed values of the `config.endian.*` / `config.bit_order.*` flags.
fn config_flag(name: &str) -> Option<u64> {
    match name {
        n if n == IOMethod::ConfigEndianBig.as_name() => Some(0),
        n if n == IOMethod::ConfigEndianLittle.as_name() => Some(1),
        n if n == IOMethod::ConfigEndianNative.as_name() => Some(2),
        n if n == IOMethod::ConfigBitOrderLsb.as_name() => Some(0),
        n if n == IOMethod::ConfigBitOrderMsb.as_name() => Some(1),
        _ => None,
    }
}

fn truncate(v: u64, int: &IntType) -> u64 {
    if int.bit_size >= 64 || int.is_signed {
        v
    } else {
        v & ((1u64 << int.bit_size) - 1)
    }
}

fn mismatch(ast: &Ast, id: NodeId, expected: &'static str, found: &Value) -> EvalError {
    EvalError::new(
        ast.loc(id),
        EvalErrorKind::KindMismatch {
            expected,
            found: found.kind_name(),
        },
    )
}

fn display_name(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Ident(i) => i.ident.clone(),
        NodeKind::MemberAccess(ma) => ast.ident_name(ma.member).unwrap_or("?").to_string(),
        _ => format!("{:?}", ast.node_type(id)),
    }
}

#[cfg(test)]
mod tests;
