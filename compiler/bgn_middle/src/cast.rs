//! `u8(x)`, `bool(x)` and friends become [`Cast`].
//!
//! A call is only a primitive cast when its callee is a bare identifier
//! spelling a builtin type. User-defined type calls are left for typing,
//! which turns them into casts once the name is resolved.

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_ir::{Ast, Call, Cast, Endian, IdentUsage, IntType, NodeId, NodeKind};

use crate::rewrite::{rewrite, set_usage, Rewrite};

pub fn resolve_primitive_cast(ast: &mut Ast, root: NodeId) -> Result<(), LocationError> {
    rewrite(ast, root, &mut CastPass).map(|_| ())
}

/// A builtin type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Primitive {
    Int(IntType),
    Bool,
    Void,
}

impl Primitive {
    /// `u8`, `s16`, `ub32` (big endian), `sl64` (little endian), `bool`, `void`.
    pub(crate) fn parse(name: &str) -> Option<Primitive> {
        match name {
            "bool" => return Some(Primitive::Bool),
            "void" => return Some(Primitive::Void),
            _ => {}
        }
        let (is_signed, rest) = if let Some(rest) = name.strip_prefix('u') {
            (false, rest)
        } else if let Some(rest) = name.strip_prefix('s') {
            (true, rest)
        } else {
            return None;
        };
        let (endian, digits) = if let Some(digits) = rest.strip_prefix('b') {
            (Endian::Big, digits)
        } else if let Some(digits) = rest.strip_prefix('l') {
            (Endian::Little, digits)
        } else {
            (Endian::Unspec, rest)
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0')
        {
            return None;
        }
        let bit_size: u64 = digits.parse().ok()?;
        (1..=64).contains(&bit_size).then_some(Primitive::Int(IntType {
            bit_size,
            is_signed,
            endian,
            is_explicit: true,
        }))
    }

    fn into_kind(self) -> NodeKind {
        match self {
            Primitive::Int(t) => t.into(),
            Primitive::Bool => NodeKind::BoolType,
            Primitive::Void => NodeKind::VoidType,
        }
    }
}

struct CastPass;

impl Rewrite for CastPass {
    type Error = LocationError;

    fn rewrite(&mut self, ast: &mut Ast, id: NodeId) -> Result<Option<NodeId>, LocationError> {
        let NodeKind::Call(Call { callee, arguments }) = ast.kind(id) else {
            return Ok(None);
        };
        let (callee, arguments) = (*callee, arguments.clone());
        let Some(primitive) = ast.ident_name(callee).and_then(Primitive::parse) else {
            return Ok(None);
        };
        if arguments.len() != 1 {
            return Err(LocationError::new(
                ErrorCode::E2007,
                ast.loc(id),
                "invalid argument count for primitive cast",
            )
            .with_note(format!("expected 1 argument but got {}", arguments.len())));
        }
        set_usage(ast, callee, IdentUsage::ReferenceType);
        let target = ast.alloc(ast.loc(callee), primitive.into_kind());
        let loc = ast.loc(id);
        let cast = ast.alloc(
            loc,
            Cast {
                base: Some(id),
                arguments,
            },
        );
        ast.node_mut(cast).expr_type = Some(target);
        Ok(Some(cast))
    }
}

#[cfg(test)]
mod tests;
