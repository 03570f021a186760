//! `error("message", args...)` statements become [`ExplicitError`].

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_ir::{Ast, Call, ExplicitError, NodeId, NodeKind, NodeType};

use crate::rewrite::{mark_builtin, rewrite_statements};

/// Only statement positions are rewritten; `error` inside an expression
/// stays a call.
#[tracing::instrument(level = "trace", skip_all)]
pub fn replace_explicit_error(ast: &mut Ast, root: NodeId) -> Result<(), LocationError> {
    let mut failure = None;
    rewrite_statements(ast, root, |ast, stmt| {
        if failure.is_some() {
            return None;
        }
        explicit_error(ast, stmt).unwrap_or_else(|e| {
            failure = Some(e);
            None
        })
    });
    failure.map_or(Ok(()), Err)
}

fn explicit_error(ast: &mut Ast, stmt: NodeId) -> Result<Option<NodeId>, LocationError> {
    let NodeKind::Call(Call { callee, arguments }) = ast.kind(stmt) else {
        return Ok(None);
    };
    if ast.ident_name(*callee) != Some("error") {
        return Ok(None);
    }
    let (callee, arguments) = (*callee, arguments.clone());
    let Some((&message, rest)) = arguments.split_first() else {
        return Err(LocationError::new(
            ErrorCode::E2010,
            ast.loc(stmt),
            "error() requires at least one argument",
        ));
    };
    if ast.node_type(message) != NodeType::StrLiteral {
        return Err(LocationError::new(
            ErrorCode::E2010,
            ast.loc(message),
            "error() requires a string literal as the first argument",
        ));
    }
    mark_builtin(ast, callee);
    let loc = ast.loc(stmt);
    Ok(Some(ast.alloc(
        loc,
        ExplicitError {
            base: Some(stmt),
            message,
            arguments: rest.to_vec(),
        },
    )))
}
