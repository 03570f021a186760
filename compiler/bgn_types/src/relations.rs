//! Relations between types: equality, comparability, the common type of
//! an arithmetic expression, and fitting untyped integer literals.
//!
//! # Design
//! The read-only relations are free functions over `&Ast`. Common type and
//! fitting may allocate (a fresh dynamic array type, a materialized integer
//! type) or write an operand's `expr_type`, so they live on [`Typing`].
//!
//! An `IntLiteralType` carries the literal's *minimal* width (bits needed
//! for its magnitude). Fitting into a concrete integer type succeeds iff the
//! target is at least that wide; two literals together materialize as an
//! unsigned integer of the wider width rounded up to 8/16/32/64.

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_eval::parse_int_literal;
use bgn_ir::{
    type_to_string, ArrayType, Ast, Endian, Format, IndentBlock, IntLiteral, IntType, NodeId,
    NodeKind, State, StrLiteral, TypeLayout,
};

use crate::{Typing, TypeResult};

/// Round a bit count up to the next machine width (8, 16, 32 or 64).
pub fn aligned_bit(bits: u64) -> u64 {
    match bits {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        _ => 64,
    }
}

/// Minimal width of the literal an `IntLiteralType` stands for.
pub fn literal_bit_size(ast: &Ast, ty: NodeId) -> Option<u64> {
    let NodeKind::IntLiteralType(lit) = ast.kind(ty) else {
        return None;
    };
    let value = parse_int_literal(&ast.get::<IntLiteral>(lit.base)?.value)?;
    Some(u64::from(64 - value.leading_zeros()).max(1))
}

/// The type a type name stands for: a format or state's struct type, an
/// enum's enum type. Anything else is returned unchanged.
pub fn resolve_alias(ast: &Ast, ty: NodeId) -> NodeId {
    let NodeKind::IdentType(it) = ast.kind(ty) else {
        return ty;
    };
    let Some(base) = it.base else {
        return ty;
    };
    let body = match ast.kind(base) {
        NodeKind::Format(Format { body, .. }) | NodeKind::State(State { body, .. }) => *body,
        NodeKind::Enum(e) => return e.enum_type.unwrap_or(ty),
        _ => return ty,
    };
    ast.get::<IndentBlock>(body)
        .and_then(|b| b.struct_type)
        .unwrap_or(ty)
}

pub(crate) fn int_shape(ast: &Ast, ty: NodeId) -> Option<(u64, bool)> {
    ast.get::<IntType>(resolve_alias(ast, ty))
        .map(|t| (t.bit_size, t.is_signed))
}

/// Whether an untyped literal of type `lit` fits the integer type `target`.
pub(crate) fn literal_fits(ast: &Ast, lit: NodeId, target: NodeId) -> bool {
    match (literal_bit_size(ast, lit), int_shape(ast, target)) {
        (Some(need), Some((have, _))) => need <= have,
        _ => false,
    }
}

/// Structural type equality.
///
/// Named types compare by what they name; struct and union types by
/// identity. Arrays need equal elements, and equal lengths when both are
/// known; a fixed array never equals a dynamic one.
pub fn equal_type(ast: &Ast, a: NodeId, b: NodeId) -> bool {
    let (a, b) = (resolve_alias(ast, a), resolve_alias(ast, b));
    if a == b {
        return true;
    }
    match (ast.kind(a), ast.kind(b)) {
        (NodeKind::IntType(x), NodeKind::IntType(y)) => {
            x.bit_size == y.bit_size && x.is_signed == y.is_signed
        }
        (NodeKind::FloatType(x), NodeKind::FloatType(y)) => x.bit_size == y.bit_size,
        (NodeKind::IntLiteralType(_), NodeKind::IntLiteralType(_)) => {
            literal_bit_size(ast, a) == literal_bit_size(ast, b)
        }
        (NodeKind::StrLiteralType(x), NodeKind::StrLiteralType(y)) => {
            let value = |id| ast.get::<StrLiteral>(id).map(|s| s.value.as_str());
            value(x.base) == value(y.base)
        }
        (NodeKind::BoolType, NodeKind::BoolType)
        | (NodeKind::VoidType, NodeKind::VoidType)
        | (NodeKind::MetaType, NodeKind::MetaType) => true,
        (NodeKind::EnumType(x), NodeKind::EnumType(y)) => x.base.is_some() && x.base == y.base,
        (NodeKind::ArrayType(x), NodeKind::ArrayType(y)) => equal_array(ast, x, y),
        (NodeKind::RangeType(x), NodeKind::RangeType(y)) => match (x.base_type, y.base_type) {
            (None, None) => true,
            (Some(p), Some(q)) => equal_type(ast, p, q),
            _ => false,
        },
        (NodeKind::FunctionType(x), NodeKind::FunctionType(y)) => {
            let returns = match (x.return_type, y.return_type) {
                (None, None) => true,
                (Some(p), Some(q)) => equal_type(ast, p, q),
                _ => false,
            };
            returns
                && x.parameters.len() == y.parameters.len()
                && x.parameters
                    .iter()
                    .zip(&y.parameters)
                    .all(|(&p, &q)| equal_type(ast, p, q))
        }
        _ => false,
    }
}

fn equal_array(ast: &Ast, x: &ArrayType, y: &ArrayType) -> bool {
    if !equal_type(ast, x.element_type, y.element_type) {
        return false;
    }
    match (x.length, y.length) {
        (None, None) => true,
        (Some(_), Some(_)) => match (x.length_value, y.length_value) {
            (Some(p), Some(q)) => p == q,
            _ => true,
        },
        _ => false,
    }
}

/// Whether values of `a` and `b` can be compared with `==` and friends.
///
/// More permissive than [`equal_type`]: untyped literals compare with any
/// integer type wide enough, the any-value range compares with everything,
/// and byte arrays compare with string and regex literals.
pub fn comparable_type(ast: &Ast, a: NodeId, b: NodeId) -> bool {
    if equal_type(ast, a, b) {
        return true;
    }
    let (a, b) = (resolve_alias(ast, a), resolve_alias(ast, b));
    match (ast.kind(a), ast.kind(b)) {
        (NodeKind::RangeType(r), _) => r.base_type.map_or(true, |base| comparable_type(ast, base, b)),
        (_, NodeKind::RangeType(r)) => r.base_type.map_or(true, |base| comparable_type(ast, a, base)),
        (NodeKind::IntType(_), NodeKind::IntLiteralType(_)) => literal_fits(ast, b, a),
        (NodeKind::IntLiteralType(_), NodeKind::IntType(_)) => literal_fits(ast, a, b),
        (NodeKind::IntLiteralType(_), NodeKind::IntLiteralType(_)) => true,
        (NodeKind::EnumType(e), NodeKind::IntLiteralType(_)) => {
            enum_base(ast, e.base).is_some_and(|base| literal_fits(ast, b, base))
        }
        (NodeKind::IntLiteralType(_), NodeKind::EnumType(e)) => {
            enum_base(ast, e.base).is_some_and(|base| literal_fits(ast, a, base))
        }
        (NodeKind::ArrayType(arr), NodeKind::StrLiteralType(s))
        | (NodeKind::StrLiteralType(s), NodeKind::ArrayType(arr)) => {
            let length = ast.get::<StrLiteral>(s.base).map(|s| s.length);
            is_byte_array(ast, arr) && (arr.length_value.is_none() || arr.length_value == length)
        }
        (NodeKind::ArrayType(arr), NodeKind::RegexLiteralType(_))
        | (NodeKind::RegexLiteralType(_), NodeKind::ArrayType(arr)) => is_byte_array(ast, arr),
        _ => false,
    }
}

pub(crate) fn enum_base(ast: &Ast, enum_: Option<NodeId>) -> Option<NodeId> {
    ast.get::<bgn_ir::Enum>(enum_?)?.base_type
}

fn is_byte_array(ast: &Ast, arr: &ArrayType) -> bool {
    int_shape(ast, arr.element_type) == Some((8, false))
}

impl Typing<'_> {
    /// Common type of an arithmetic expression over `a` and `b`.
    pub(crate) fn common_type(&mut self, a: NodeId, b: NodeId) -> Option<NodeId> {
        self.common_type_at(a, b, 0)
    }

    fn common_type_at(&mut self, a: NodeId, b: NodeId, depth: usize) -> Option<NodeId> {
        if depth > 8 {
            return None;
        }
        if equal_type(self.ast, a, b) {
            return Some(a);
        }
        let (ra, rb) = (resolve_alias(self.ast, a), resolve_alias(self.ast, b));
        match (self.ast.kind(ra).clone(), self.ast.kind(rb).clone()) {
            (NodeKind::IntType(x), NodeKind::IntType(y)) => Some(match x.bit_size.cmp(&y.bit_size) {
                std::cmp::Ordering::Greater => a,
                std::cmp::Ordering::Less => b,
                std::cmp::Ordering::Equal if x.is_signed => b,
                std::cmp::Ordering::Equal => a,
            }),
            (NodeKind::IntType(_), NodeKind::IntLiteralType(_)) => {
                literal_fits(self.ast, rb, ra).then_some(a)
            }
            (NodeKind::IntLiteralType(_), NodeKind::IntType(_)) => {
                literal_fits(self.ast, ra, rb).then_some(b)
            }
            (NodeKind::IntLiteralType(_), NodeKind::IntLiteralType(_)) => {
                let wa = literal_bit_size(self.ast, ra).unwrap_or(64);
                let wb = literal_bit_size(self.ast, rb).unwrap_or(64);
                Some(if wa >= wb { a } else { b })
            }
            (NodeKind::UnionType(u), _) => {
                let common = u.common_type?;
                self.common_type_at(common, b, depth + 1)
            }
            (_, NodeKind::UnionType(u)) => {
                let common = u.common_type?;
                self.common_type_at(a, common, depth + 1)
            }
            (NodeKind::ArrayType(x), NodeKind::ArrayType(y))
                if equal_type(self.ast, x.element_type, y.element_type) =>
            {
                let loc = self.ast.loc(a);
                Some(self.ast.alloc(
                    loc,
                    ArrayType {
                        element_type: x.element_type,
                        length: None,
                        length_value: None,
                        is_explicit: false,
                        layout: TypeLayout::default(),
                    },
                ))
            }
            (NodeKind::StructType(_), _) | (_, NodeKind::StructType(_)) => {
                self.common_via_cast_fns(ra, b, depth)
                    .or_else(|| self.common_via_cast_fns(rb, a, depth))
            }
            _ => None,
        }
    }

    /// Try each cast function of the format behind `st` as a conversion
    /// towards `other`.
    fn common_via_cast_fns(&mut self, st: NodeId, other: NodeId, depth: usize) -> Option<NodeId> {
        let format = self.ast.get::<bgn_ir::StructType>(st)?.base?;
        let cast_fns = self.ast.get::<Format>(format)?.cast_fns.clone();
        cast_fns.into_iter().find_map(|f| {
            let ret = self.ast.get::<bgn_ir::Function>(f)?.return_type?;
            self.common_type_at(ret, other, depth + 1)
        })
    }

    /// Give an untyped literal expression `expr` the integer type `target`,
    /// checking the width. Other combinations are left alone.
    pub(crate) fn fit_to(&mut self, expr: NodeId, target: NodeId) -> TypeResult<()> {
        let Some(ty) = self.ast.expr_type(expr) else {
            return Ok(());
        };
        if !self.ast.is::<bgn_ir::IntLiteralType>(ty) {
            return Ok(());
        }
        let resolved = resolve_alias(self.ast, target);
        let int_target = match self.ast.kind(resolved) {
            NodeKind::IntType(_) => Some(resolved),
            NodeKind::EnumType(e) => enum_base(self.ast, e.base)
                .filter(|&b| self.ast.is::<IntType>(resolve_alias(self.ast, b))),
            _ => None,
        };
        let Some(int_target) = int_target else {
            return Ok(());
        };
        let need = literal_bit_size(self.ast, ty).unwrap_or(64);
        let Some((have, _)) = int_shape(self.ast, int_target) else {
            return Ok(());
        };
        if need > have {
            return Err(LocationError::new(
                ErrorCode::E2003,
                self.ast.loc(expr),
                format!(
                    "bit size {need} is too large for {}",
                    type_to_string(self.ast, target)
                ),
            ));
        }
        self.ast.node_mut(expr).expr_type = Some(target);
        Ok(())
    }

    /// Fit two operands against each other.
    ///
    /// A literal next to a concrete integer takes that integer's type; two
    /// literals both become an unsigned integer of the wider width.
    pub(crate) fn fit(&mut self, left: NodeId, right: NodeId) -> TypeResult<()> {
        let (Some(lt), Some(rt)) = (self.ast.expr_type(left), self.ast.expr_type(right)) else {
            return Ok(());
        };
        let l_lit = self.ast.is::<bgn_ir::IntLiteralType>(lt);
        let r_lit = self.ast.is::<bgn_ir::IntLiteralType>(rt);
        match (l_lit, r_lit) {
            (true, true) => {
                let wl = literal_bit_size(self.ast, lt).unwrap_or(64);
                let wr = literal_bit_size(self.ast, rt).unwrap_or(64);
                let ty = self.int_type_at(left, aligned_bit(wl.max(wr)), false);
                self.ast.node_mut(left).expr_type = Some(ty);
                self.ast.node_mut(right).expr_type = Some(ty);
                Ok(())
            }
            (false, true) => self.fit_to(right, lt),
            (true, false) => self.fit_to(left, rt),
            (false, false) => Ok(()),
        }
    }

    /// The concrete type an expression's literal type materializes as when
    /// it stands alone (`x := 10`).
    pub(crate) fn materialize(&mut self, expr: NodeId) -> Option<NodeId> {
        let ty = self.ast.expr_type(expr)?;
        if !self.ast.is::<bgn_ir::IntLiteralType>(ty) {
            return Some(ty);
        }
        let bits = aligned_bit(literal_bit_size(self.ast, ty).unwrap_or(64));
        let int = self.int_type_at(expr, bits, false);
        self.ast.node_mut(expr).expr_type = Some(int);
        Some(int)
    }

    pub(crate) fn int_type_at(&mut self, at: NodeId, bit_size: u64, is_signed: bool) -> NodeId {
        let loc = self.ast.loc(at);
        self.ast.alloc(
            loc,
            IntType {
                bit_size,
                is_signed,
                endian: Endian::Unspec,
                is_explicit: false,
            },
        )
    }
}

#[cfg(test)]
mod tests;
