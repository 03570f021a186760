//! Definitions, assignments and `for` binders.

use bgn_diagnostic::ErrorCode;
use bgn_ir::{Binary, BinaryOp, ConstantLevel, Ident, IdentUsage, NodeId, NodeKind, NodeType};

use crate::relations::{equal_type, resolve_alias};
use crate::{Typing, TypeResult};

impl Typing<'_> {
    pub(crate) fn type_assign(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(&Binary { op, left, right }) = self.ast.get::<Binary>(id) else {
            return Ok(());
        };
        match op {
            BinaryOp::DefineAssign | BinaryOp::ConstAssign => self.type_define(id, op, left, right),
            BinaryOp::InAssign => self.type_in_assign(id, left, right),
            BinaryOp::Assign => self.type_plain_assign(id, left, right),
            _ => self.type_compound_assign(id, op, left, right),
        }
    }

    fn finish_statement(&mut self, id: NodeId, level: ConstantLevel) {
        let void = self.alloc_at(id, NodeKind::VoidType);
        self.set_type(id, void, level);
    }

    /// `x := e` / `x ::= e`. The right side is typed while the binary is
    /// marked in progress, so a constant reaching itself is reported.
    fn type_define(&mut self, id: NodeId, op: BinaryOp, left: NodeId, right: NodeId) -> TypeResult<()> {
        if self.ast.expr_type(id).is_some() || !self.resolving.insert(id) {
            return Ok(());
        }
        let typed = self.type_slot(id, right);
        self.resolving.remove(&id);
        let right = typed?;
        let Some(ty) = self.materialize(right) else {
            self.skip_untyped(id, right);
            return Ok(());
        };
        let level = match (op, self.level(right)) {
            (BinaryOp::ConstAssign, ConstantLevel::Constant) => ConstantLevel::Constant,
            (BinaryOp::ConstAssign, _) => ConstantLevel::ImmutableVariable,
            _ => ConstantLevel::Variable,
        };
        self.set_type(left, ty, level);
        self.finish_statement(id, level);
        Ok(())
    }

    /// `for x in e`: integers count up to `e`, strings yield bytes,
    /// ranges yield their base type, arrays their element type.
    fn type_in_assign(&mut self, id: NodeId, left: NodeId, right: NodeId) -> TypeResult<()> {
        let right = self.type_slot(id, right)?;
        let Some(ty) = self.ast.expr_type(right) else {
            self.skip_untyped(id, right);
            return Ok(());
        };
        let resolved = resolve_alias(self.ast, ty);
        let element = match self.ast.kind(resolved) {
            NodeKind::IntType(_) | NodeKind::IntLiteralType(_) => self.materialize(right),
            NodeKind::StrLiteralType(_) => Some(self.int_type_at(right, 8, false)),
            NodeKind::ArrayType(a) => Some(a.element_type),
            NodeKind::RangeType(r) => match r.base_type {
                Some(base) => Some(base),
                None => {
                    return Err(self.error(
                        ErrorCode::E2005,
                        right,
                        "cannot iterate over a range without endpoints",
                    ))
                }
            },
            _ => None,
        };
        let Some(element) = element else {
            return Err(self.error(
                ErrorCode::E2005,
                right,
                format!(
                    "cannot use {} in `for in` syntax; integer, string, range, and array are allowed",
                    self.type_name(ty)
                ),
            ));
        };
        // Array binders stay variables unless the array itself is fixed.
        let fixed = match self.ast.kind(resolved) {
            NodeKind::ArrayType(_) => matches!(
                self.level(right),
                ConstantLevel::Constant | ConstantLevel::ImmutableVariable
            ),
            _ => true,
        };
        let (usage, level) = if fixed {
            (IdentUsage::DefineConst, ConstantLevel::ImmutableVariable)
        } else {
            (IdentUsage::DefineVariable, ConstantLevel::Variable)
        };
        if let Some(binder) = self.ast.get_mut::<Ident>(left) {
            binder.usage = usage;
        }
        self.set_type(left, element, level);
        self.finish_statement(id, ConstantLevel::Variable);
        Ok(())
    }

    /// Type the target of `=` or a compound assignment, rejecting names
    /// that are undefined or not assignable.
    fn type_assign_target(&mut self, id: NodeId, left: NodeId) -> TypeResult<NodeId> {
        let usage = self.ast.get::<Ident>(left).map(|i| i.usage);
        if usage == Some(IdentUsage::Unknown) {
            let name = self.ast.ident_name(left).unwrap_or("?").to_string();
            let Some(def) = self.find_definition(left) else {
                return Err(self.error(
                    ErrorCode::E1001,
                    left,
                    format!("identifier {name} is not defined before; use := to define identifier"),
                ));
            };
            let assignable = self.ast.get::<Ident>(def).is_some_and(|d| {
                matches!(
                    d.usage,
                    IdentUsage::DefineVariable | IdentUsage::DefineField | IdentUsage::DefineArg
                )
            });
            if !assignable {
                return Err(self.error(
                    ErrorCode::E2004,
                    left,
                    format!("cannot assign to {name}"),
                ));
            }
        }
        let target = self.type_slot(id, left)?;
        if self.ast.node_type(target) == NodeType::TypeLiteral {
            return Err(self.error(ErrorCode::E2004, left, "cannot assign to a type"));
        }
        Ok(target)
    }

    fn type_plain_assign(&mut self, id: NodeId, left: NodeId, right: NodeId) -> TypeResult<()> {
        let left = self.type_assign_target(id, left)?;
        let right = self.type_slot(id, right)?;
        let (Some(lt), Some(_)) = (self.ast.expr_type(left), self.ast.expr_type(right)) else {
            let untyped = if self.ast.expr_type(left).is_none() { left } else { right };
            self.skip_untyped(id, untyped);
            return Ok(());
        };
        self.fit_to(right, lt)?;
        let rt = self.ast.expr_type(right).unwrap_or(lt);
        if !equal_type(self.ast, lt, rt) {
            return Err(self.error(
                ErrorCode::E2001,
                id,
                format!(
                    "cannot assign {} to {}",
                    self.type_name(rt),
                    self.type_name(lt)
                ),
            ));
        }
        self.finish_statement(id, ConstantLevel::Variable);
        Ok(())
    }

    /// `x op= e` must produce a value of `x`'s own type.
    fn type_compound_assign(
        &mut self,
        id: NodeId,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> TypeResult<()> {
        let Some(base_op) = op.compound_base() else {
            return Ok(());
        };
        let left = self.type_assign_target(id, left)?;
        let right = self.type_slot(id, right)?;
        let (Some(lt), Some(_)) = (self.ast.expr_type(left), self.ast.expr_type(right)) else {
            let untyped = if self.ast.expr_type(left).is_none() { left } else { right };
            self.skip_untyped(id, untyped);
            return Ok(());
        };
        self.fit_to(right, lt)?;
        let rt = self.ast.expr_type(right).unwrap_or(lt);
        let result = self.binary_result(base_op, id, lt, rt);
        let Some(result) = result else {
            return Err(self.error(
                ErrorCode::E2002,
                id,
                format!(
                    "binary op {op} is not valid between {} and {}",
                    self.type_name(lt),
                    self.type_name(rt)
                ),
            ));
        };
        if !equal_type(self.ast, result, lt) {
            return Err(self.error(
                ErrorCode::E2001,
                id,
                format!(
                    "result of {op} is {} but target is {}",
                    self.type_name(result),
                    self.type_name(lt)
                ),
            ));
        }
        self.finish_statement(id, ConstantLevel::Variable);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
