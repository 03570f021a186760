//! Identifier and type-name resolution.
//!
//! A reference is resolved by searching its scope chain outward (only
//! occurrences before it in its own segment), then the top-level segments
//! of the current program for names that may be used before their
//! declaration: constants, formats, states, enums and functions. A found
//! definition that has not been typed yet is typed on the spot, guarded by
//! the in-progress set so `a ::= b` / `b ::= a` reports a cycle.

use bgn_diagnostic::ErrorCode;
use bgn_ir::{
    ArrayType, Ast, BinaryOp, ConstantLevel, Enum, EnumMember, Field, Format, Function, Ident,
    IdentType, IdentUsage, NodeId, NodeKind, State, TypeLiteral,
};

use crate::{Typing, TypeResult};

/// Definitions visible before their declaration.
fn forward_referable(usage: IdentUsage) -> bool {
    matches!(
        usage,
        IdentUsage::DefineConst
            | IdentUsage::DefineFormat
            | IdentUsage::DefineState
            | IdentUsage::DefineEnum
            | IdentUsage::DefineFn
            | IdentUsage::DefineCastFn
    )
}

fn matches_name(
    ast: &Ast,
    candidate: NodeId,
    from: NodeId,
    name: &str,
    accept: impl Fn(IdentUsage) -> bool,
) -> bool {
    candidate != from
        && ast
            .get::<Ident>(candidate)
            .is_some_and(|c| c.ident == name && accept(c.usage))
}

impl Typing<'_> {
    /// Defining identifier `ident` refers to, if any.
    pub(crate) fn find_definition(&self, ident: NodeId) -> Option<NodeId> {
        self.find_definition_by(ident, IdentUsage::is_lookup_candidate, forward_referable)
    }

    fn find_definition_by(
        &self,
        ident: NodeId,
        local: impl Fn(IdentUsage) -> bool + Copy,
        global: impl Fn(IdentUsage) -> bool + Copy,
    ) -> Option<NodeId> {
        let i = self.ast.get::<Ident>(ident)?;
        let name = i.ident.as_str();
        let found = i.scope.and_then(|scope| {
            self.ast.lookup_local(scope, Some(ident), |ast, c| {
                matches_name(ast, c, ident, name, local)
            })
        });
        found.or_else(|| {
            let g = self.current_global?;
            self.ast
                .lookup_global(g, |ast, c| matches_name(ast, c, ident, name, global))
        })
    }

    /// Make sure the definition `def` has its type, typing it now if it is
    /// declared later or still pending.
    pub(crate) fn ensure_typed_definition(&mut self, def: NodeId) -> TypeResult<()> {
        if self.ast.expr_type(def).is_some() {
            return Ok(());
        }
        let Some(base) = self.ast.get::<Ident>(def).and_then(|i| i.base) else {
            return Ok(());
        };
        match self.ast.kind(base) {
            NodeKind::Binary(b)
                if matches!(
                    b.op,
                    BinaryOp::DefineAssign | BinaryOp::ConstAssign | BinaryOp::InAssign
                ) =>
            {
                self.force_type(def, base)?;
            }
            NodeKind::Field(_) => self.force_type(def, base)?,
            NodeKind::Function(Function {
                func_type: Some(ft),
                ..
            }) => {
                let ft = *ft;
                self.set_type(def, ft, ConstantLevel::Constant);
            }
            NodeKind::EnumMember(EnumMember {
                belong: Some(e), ..
            }) => {
                if let Some(et) = self.ast.get::<Enum>(*e).and_then(|e| e.enum_type) {
                    self.set_type(def, et, ConstantLevel::Constant);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn force_type(&mut self, def: NodeId, base: NodeId) -> TypeResult<()> {
        if self.resolving.contains(&base) {
            let name = self.ast.ident_name(def).unwrap_or("?").to_string();
            let message = if self.ast.get::<Ident>(def).map(|i| i.usage) == Some(IdentUsage::DefineConst) {
                format!("circular constant definition of {name}")
            } else {
                format!("{name} is used in its own definition")
            };
            return Err(self.error(ErrorCode::E1005, def, message));
        }
        tracing::trace!(?def, "typing definition on demand");
        self.type_node(base)?;
        Ok(())
    }

    /// Resolve a name in expression position.
    ///
    /// A name that denotes a format, state or enum is rewritten into a
    /// `TypeLiteral`, which is returned in its place.
    pub(crate) fn type_ident(&mut self, id: NodeId) -> TypeResult<NodeId> {
        let Some(ident) = self.ast.get::<Ident>(id) else {
            return Ok(id);
        };
        if ident.usage != IdentUsage::Unknown {
            if ident.usage == IdentUsage::Reference && self.ast.expr_type(id).is_none() {
                let def = self.ast.definition_ident(id);
                if let Some(ty) = self.ast.expr_type(def) {
                    let level = self.level(def);
                    self.set_type(id, ty, level);
                }
            }
            return Ok(id);
        }
        let name = ident.ident.clone();
        let Some(def) = self.find_definition(id) else {
            return Err(self.error(
                ErrorCode::E1001,
                id,
                format!("identifier {name} is not defined"),
            ));
        };
        self.ensure_typed_definition(def)?;
        let Some(d) = self.ast.get::<Ident>(def) else {
            return Ok(id);
        };
        let (def_usage, member) = (d.usage, d.base);
        if def_usage.defines_type() {
            if let Some(i) = self.ast.get_mut::<Ident>(id) {
                i.usage = IdentUsage::ReferenceType;
                i.base = Some(def);
            }
            let ident_type = self.alloc_at(
                id,
                IdentType {
                    ident: id,
                    base: member,
                },
            );
            let literal = self.alloc_at(
                id,
                TypeLiteral {
                    type_literal: ident_type,
                },
            );
            let meta = self.alloc_at(id, NodeKind::MetaType);
            self.set_type(literal, meta, ConstantLevel::Constant);
            return Ok(literal);
        }
        if let Some(i) = self.ast.get_mut::<Ident>(id) {
            i.usage = IdentUsage::Reference;
            i.base = Some(def);
        }
        if let Some(ty) = self.ast.expr_type(def) {
            let level = self.level(def);
            self.set_type(id, ty, level);
        }
        if let (IdentUsage::DefineField, Some(field)) = (def_usage, member) {
            self.register_state_variable(field);
        }
        Ok(id)
    }

    /// A format that reads a field holding a state (or an array of them)
    /// carries that field as one of its state variables.
    fn register_state_variable(&mut self, field: NodeId) {
        let Some(format) = self.current_format.filter(|&f| self.ast.is::<Format>(f)) else {
            return;
        };
        let Some(mut ty) = self.ast.get::<Field>(field).map(|f| f.field_type) else {
            return;
        };
        while let Some(array) = self.ast.get::<ArrayType>(ty) {
            ty = array.element_type;
        }
        let holds_state = self
            .ast
            .get::<IdentType>(ty)
            .and_then(|t| t.base)
            .is_some_and(|b| self.ast.is::<State>(b));
        if !holds_state {
            return;
        }
        if let Some(f) = self.ast.get_mut::<Field>(field) {
            f.is_state_variable = true;
        }
        if let Some(f) = self.ast.get_mut::<Format>(format) {
            if !f.state_variables.contains(&field) {
                tracing::trace!(?field, "state variable");
                f.state_variables.push(field);
            }
        }
    }

    /// Bind an `IdentType` to the format, state or enum it names.
    pub(crate) fn resolve_ident_type(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(it) = self.ast.get::<IdentType>(id) else {
            return Ok(());
        };
        if it.base.is_some() {
            self.record_dependency(id);
            return Ok(());
        }
        let ident = it.ident;
        let Some(def) =
            self.find_definition_by(ident, IdentUsage::defines_type, IdentUsage::defines_type)
        else {
            let name = self.ast.ident_name(ident).unwrap_or("?").to_string();
            return Err(match self.find_definition(ident) {
                Some(_) => self.error(ErrorCode::E2012, ident, format!("{name} is not a type")),
                None => self.error(
                    ErrorCode::E1001,
                    ident,
                    format!("type {name} is not defined"),
                ),
            });
        };
        let member = self.ast.get::<Ident>(def).and_then(|d| d.base);
        if let Some(i) = self.ast.get_mut::<Ident>(ident) {
            i.usage = IdentUsage::ReferenceType;
            i.base = Some(def);
        }
        if let Some(it) = self.ast.get_mut::<IdentType>(id) {
            it.base = member;
        }
        self.record_dependency(id);
        Ok(())
    }

    /// A field type naming another format makes the enclosing format
    /// depend on it.
    fn record_dependency(&mut self, ident_type: NodeId) {
        let Some(target) = self.ast.get::<IdentType>(ident_type).and_then(|t| t.base) else {
            return;
        };
        let Some(current) = self.current_format.filter(|&f| f != target) else {
            return;
        };
        if !self.ast.is::<Format>(target) {
            return;
        }
        if let Some(f) = self.ast.get_mut::<Format>(current) {
            if !f.depends.contains(&ident_type) {
                f.depends.push(ident_type);
            }
        }
    }
}

#[cfg(test)]
mod tests;
