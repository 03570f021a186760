//! Inverting expressions of one unknown.
//!
//! Given `len * 2 - 4` with `len` the only identifier, the resolver builds
//! `(y + 4) / 2` where `y` is a `TmpVar` placeholder. Binding the placeholder
//! to an observed value and evaluating the result recovers `len`.
//!
//! Only `+ - * /` and left shifts by a known amount are inverted, plus
//! unary operators, which are their own inverse here. Division is integer
//! division, so the inverse is exact only when the original divided evenly.

use bgn_ir::{Ast, Binary, BinaryOp, NodeId, NodeKind, TmpVar, Unary};

use crate::error::{EvalError, EvalErrorKind};
use crate::eval::Evaluator;
use crate::value::Value;

/// Builds inverse expressions in terms of a fixed placeholder id.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinearResolver {
    placeholder: u64,
}

/// The inverse of an expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// The identifier solved for.
    pub ident: NodeId,
    /// `TmpVar` id standing for the expression's value.
    pub placeholder: u64,
    /// Expression computing `ident` from the placeholder.
    pub expr: NodeId,
}

impl Solution {
    /// Value of the identifier when the original expression equals `value`.
    pub fn eval(&self, ast: &Ast, value: u64) -> Result<u64, EvalError> {
        Evaluator::resolve_ident()
            .with_tmp(self.placeholder, Value::Int(value))
            .eval_int(ast, self.expr)
    }
}

impl LinearResolver {
    pub fn new(placeholder: u64) -> Self {
        LinearResolver { placeholder }
    }

    /// The single identifier of `expr`.
    ///
    /// Literals and operators are allowed around it; calls, member accesses
    /// and a second identifier occurrence are not.
    pub fn find_ident(&self, ast: &Ast, expr: NodeId) -> Result<NodeId, EvalError> {
        let mut found = None;
        for id in ast.descendants(expr) {
            let not_linear = |what| Err(EvalError::new(ast.loc(id), EvalErrorKind::NotLinear(what)));
            match ast.kind(id) {
                NodeKind::Ident(_) if found.is_some() => {
                    return not_linear("more than one identifier");
                }
                NodeKind::Ident(_) => found = Some(id),
                NodeKind::IntLiteral(_)
                | NodeKind::CharLiteral(_)
                | NodeKind::Paren(_)
                | NodeKind::Identity(_)
                | NodeKind::Unary(_)
                | NodeKind::Binary(_) => {}
                NodeKind::Call(_) => return not_linear("call"),
                NodeKind::MemberAccess(_) => return not_linear("member access"),
                _ => return not_linear("non-arithmetic expression"),
            }
        }
        found.ok_or_else(|| {
            EvalError::new(ast.loc(expr), EvalErrorKind::NotLinear("no identifier"))
        })
    }

    /// Build the inverse of `expr`. Existing nodes are left untouched; the
    /// non-identifier operands are deep-copied into the new expression.
    #[tracing::instrument(level = "debug", skip(self, ast), fields(expr = ?expr))]
    pub fn resolve(&self, ast: &mut Ast, expr: NodeId) -> Result<Solution, EvalError> {
        let ident = self.find_ident(ast, expr)?;
        let loc = ast.loc(expr);
        let mut acc = ast.alloc(
            loc,
            TmpVar {
                tmp_var: self.placeholder,
            },
        );
        let mut cur = expr;
        while cur != ident {
            match ast.kind(cur).clone() {
                NodeKind::Paren(p) => cur = p.expr,
                NodeKind::Identity(i) => cur = i.expr,
                NodeKind::Unary(u) => {
                    acc = ast.alloc(loc, Unary { op: u.op, expr: acc });
                    cur = u.expr;
                }
                NodeKind::Binary(b) => {
                    let on_left = ast.descendants(b.left).contains(&ident);
                    let (next, other) = if on_left {
                        (b.left, b.right)
                    } else {
                        (b.right, b.left)
                    };
                    let other = ast.deep_copy(other);
                    let (op, left, right) = match (b.op, on_left) {
                        (BinaryOp::Add, _) => (BinaryOp::Sub, acc, other),
                        (BinaryOp::Sub, true) => (BinaryOp::Add, acc, other),
                        (BinaryOp::Sub, false) => (BinaryOp::Sub, other, acc),
                        (BinaryOp::Mul, _) => (BinaryOp::Div, acc, other),
                        (BinaryOp::Div, true) => (BinaryOp::Mul, acc, other),
                        (BinaryOp::Div, false) => (BinaryOp::Div, other, acc),
                        (BinaryOp::LeftLogicalShift | BinaryOp::LeftArithmeticShift, true) => {
                            (BinaryOp::RightLogicalShift, acc, other)
                        }
                        (op, _) => {
                            return Err(EvalError::new(
                                ast.loc(cur),
                                EvalErrorKind::NotLinear(op.as_symbol()),
                            ))
                        }
                    };
                    acc = ast.alloc(loc, Binary { op, left, right });
                    cur = next;
                }
                _ => {
                    return Err(EvalError::new(
                        ast.loc(cur),
                        EvalErrorKind::NotLinear("non-arithmetic expression"),
                    ))
                }
            }
        }
        tracing::debug!(?ident, solution = ?acc, "resolved linear expression");
        Ok(Solution {
            ident,
            placeholder: self.placeholder,
            expr: acc,
        })
    }
}
