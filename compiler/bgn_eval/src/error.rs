//! Evaluation failures.

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_ir::{EscapeError, Loc, NodeType};
use thiserror::Error;

/// What went wrong while folding an expression.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("expected {expected} but got {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("operator `{op}` is not supported for {operand}")]
    InvalidOperator { op: &'static str, operand: &'static str },
    #[error("cannot unescape string literal: {0}")]
    Unescape(#[from] EscapeError),
    #[error("identifier `{0}` is not allowed in this context")]
    IdentNotAllowed(String),
    #[error("identifier `{0}` is not a constant")]
    NotConstant(String),
    #[error("invalid integer literal `{0}`")]
    BadIntLiteral(String),
    #[error("constant `{0}` depends on itself")]
    Recursive(String),
    #[error("cannot evaluate {0:?}")]
    Unsupported(NodeType),
    #[error("unsupported expression for linear resolution: {0}")]
    NotLinear(&'static str),
}

/// An evaluation failure at the offending sub-expression.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub loc: Loc,
    pub kind: EvalErrorKind,
}

impl EvalError {
    #[cold]
    pub fn new(loc: Loc, kind: EvalErrorKind) -> Self {
        EvalError { loc, kind }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            EvalErrorKind::DivisionByZero | EvalErrorKind::ModuloByZero => ErrorCode::E5002,
            EvalErrorKind::KindMismatch { .. } | EvalErrorKind::InvalidOperator { .. } => {
                ErrorCode::E5003
            }
            EvalErrorKind::Unescape(_) => ErrorCode::E5004,
            EvalErrorKind::IdentNotAllowed(_) => ErrorCode::E5005,
            EvalErrorKind::NotConstant(_)
            | EvalErrorKind::BadIntLiteral(_)
            | EvalErrorKind::Recursive(_) => ErrorCode::E5001,
            EvalErrorKind::Unsupported(_) | EvalErrorKind::NotLinear(_) => ErrorCode::E5006,
        }
    }
}

impl From<EvalError> for LocationError {
    fn from(err: EvalError) -> Self {
        LocationError::new(err.code(), err.loc, err.kind.to_string())
    }
}
