//! Per-node dispatch and declaration typing.
//!
//! [`Typing::type_node`] returns the node that stands in the typed node's
//! place afterwards. Most forms return themselves; desugaring forms return
//! a replacement, and [`Typing::type_slot`] writes it into the parent.

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_eval::Evaluator;
use bgn_ir::{
    ConstantLevel, Enum, EnumMember, Field, Function, IndentBlock, Loop, Metadata, NodeId,
    NodeType, OrderType, Program, SpecifyOrder, StructType, UnionCandidate, UnionType,
};

use crate::relations::equal_type;
use crate::{Typing, TypeResult};

impl Typing<'_> {
    /// Type `id` and everything it owns.
    #[tracing::instrument(level = "trace", skip(self), fields(kind = ?self.ast.node_type(id)))]
    pub(crate) fn type_node(&mut self, id: NodeId) -> TypeResult<NodeId> {
        bgn_stack::ensure_sufficient_stack(|| self.dispatch(id))
    }

    fn dispatch(&mut self, id: NodeId) -> TypeResult<NodeId> {
        match self.ast.node_type(id) {
            NodeType::Program => self.type_program_node(id)?,
            NodeType::IndentBlock => {
                self.type_children(id)?;
                self.apply_block_type_map(id)?;
            }
            NodeType::ArrayType => {
                self.type_children(id)?;
                self.fold_array_length(id)?;
            }
            NodeType::IdentType => self.resolve_ident_type(id)?,
            NodeType::UnionType => {
                self.type_children(id)?;
                self.type_union(id);
            }
            NodeType::Field => self.type_field(id)?,
            NodeType::Format | NodeType::State => {
                let prev = self.current_format.replace(id);
                let result = self.type_children(id);
                self.current_format = prev;
                result?;
            }
            NodeType::Enum => self.type_enum(id)?,
            NodeType::Function => self.type_function(id)?,
            NodeType::Loop => self.type_loop(id)?,
            NodeType::Assert => {
                if let Some(cond) = self.ast.get::<bgn_ir::Assert>(id).map(|a| a.cond) {
                    let cond = self.type_slot(id, cond)?;
                    self.require_bool(cond, "assert condition")?;
                }
            }
            NodeType::Return => self.type_return(id)?,
            ty if ty.is_expr() => return self.type_expr(id),
            _ => self.type_children(id)?,
        }
        Ok(id)
    }

    /// Type the owned child `child` of `parent`, writing a replacement
    /// back into the parent's slot.
    pub(crate) fn type_slot(&mut self, parent: NodeId, child: NodeId) -> TypeResult<NodeId> {
        let typed = self.type_node(child)?;
        if typed != child {
            self.ast.replace_child(parent, child, typed);
        }
        Ok(typed)
    }

    pub(crate) fn type_children(&mut self, id: NodeId) -> TypeResult<()> {
        for child in self.ast.children(id) {
            self.type_slot(id, child)?;
        }
        Ok(())
    }

    pub(crate) fn require_bool(&self, expr: NodeId, what: &str) -> TypeResult<()> {
        match self.ast.expr_type(expr) {
            Some(ty) if self.ast.node_type(ty) != NodeType::BoolType => Err(self.error(
                ErrorCode::E2001,
                expr,
                format!("{what} must be bool but got {}", self.type_name(ty)),
            )),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Programs and blocks
    // ------------------------------------------------------------------

    fn type_program_node(&mut self, id: NodeId) -> TypeResult<()> {
        if !self.typed_programs.insert(id) {
            return Ok(());
        }
        let Some(global) = self.ast.get::<Program>(id).map(|p| p.global_scope) else {
            return Ok(());
        };
        let prev = self.current_global.replace(global);
        let result = self.type_children(id);
        self.current_global = prev;
        result?;
        self.select_byte_order(id);
        Ok(())
    }

    /// The last byte-order directive of a program wins.
    fn select_byte_order(&mut self, program: NodeId) {
        let elements = self
            .ast
            .get::<Program>(program)
            .map(|p| p.elements.clone())
            .unwrap_or_default();
        let mut endian = None;
        for e in elements {
            let is_byte_order = self
                .ast
                .get::<SpecifyOrder>(e)
                .is_some_and(|s| s.order_type == OrderType::Byte);
            if !is_byte_order {
                continue;
            }
            if endian.is_some() {
                self.warn(
                    ErrorCode::W0003,
                    e,
                    "byte order is specified but endian is already specified. overwritten by after one",
                );
            }
            endian = Some(e);
        }
        if let Some(p) = self.ast.get_mut::<Program>(program) {
            p.endian = endian;
        }
    }

    /// `config.type = T` inside a block fixes the block struct's wire type.
    fn apply_block_type_map(&mut self, block: NodeId) -> TypeResult<()> {
        let Some(b) = self.ast.get::<IndentBlock>(block) else {
            return Ok(());
        };
        let struct_type = b.struct_type;
        let mut directives = b.metadata.clone();
        directives.extend(
            b.elements
                .iter()
                .copied()
                .filter(|&e| self.ast.is::<Metadata>(e) && !b.metadata.contains(&e)),
        );
        for m in directives {
            let Some(meta) = self.ast.get::<Metadata>(m) else {
                continue;
            };
            if meta.name != "config.type" {
                continue;
            }
            let value = meta.values.first().copied();
            let Some(value) = value.filter(|&v| self.ast.node_type(v) == NodeType::TypeLiteral) else {
                return Err(self.error(ErrorCode::E4001, m, "config.type must be a type literal"));
            };
            if let Some(st) = struct_type.and_then(|st| self.ast.get_mut::<StructType>(st)) {
                st.type_map = Some(value);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// A constant array length is folded into `length_value`.
    fn fold_array_length(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(length) = self.ast.get::<bgn_ir::ArrayType>(id).and_then(|a| a.length) else {
            return Ok(());
        };
        if self.level(length) != ConstantLevel::Constant {
            return Ok(());
        }
        let value = Evaluator::resolve_ident()
            .eval_int(self.ast, length)
            .map_err(LocationError::from)?;
        if let Some(arr) = self.ast.get_mut::<bgn_ir::ArrayType>(id) {
            arr.length_value = Some(value);
        }
        Ok(())
    }

    /// Common type of the fields a union's candidates activate.
    fn type_union(&mut self, id: NodeId) {
        let candidates = self
            .ast
            .get::<UnionType>(id)
            .map(|u| u.candidates.clone())
            .unwrap_or_default();
        let field_types: Vec<NodeId> = candidates
            .into_iter()
            .filter_map(|c| self.ast.get::<UnionCandidate>(c).and_then(|c| c.field))
            .filter_map(|f| self.ast.get::<Field>(f).map(|f| f.field_type))
            .collect();
        let mut common = field_types.first().copied();
        for &ft in field_types.iter().skip(1) {
            common = common.and_then(|t| self.common_type(t, ft));
        }
        if let Some(u) = self.ast.get_mut::<UnionType>(id) {
            u.common_type = common;
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn type_enum(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(e) = self.ast.get::<Enum>(id) else {
            return Ok(());
        };
        let (base_type, members, enum_type) = (e.base_type, e.members.clone(), e.enum_type);
        let base_type = match base_type {
            Some(bt) => Some(self.type_slot(id, bt)?),
            None => None,
        };
        for m in members {
            let Some(member) = self.ast.get::<EnumMember>(m) else {
                continue;
            };
            let (ident, value) = (member.ident, member.value);
            if let Some(value) = value {
                let value = self.type_slot(m, value)?;
                if let Some(bt) = base_type {
                    self.fit_to(value, bt)?;
                }
            }
            if let Some(et) = enum_type {
                self.set_type(ident, et, ConstantLevel::Constant);
            }
        }
        Ok(())
    }

    fn type_function(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(f) = self.ast.get::<Function>(id) else {
            return Ok(());
        };
        let (ident, parameters, return_type, body, func_type) =
            (f.ident, f.parameters.clone(), f.return_type, f.body, f.func_type);
        for p in parameters {
            self.type_slot(id, p)?;
        }
        if let Some(rt) = return_type {
            self.type_slot(id, rt)?;
        }
        if let Some(ft) = func_type {
            self.set_type(ident, ft, ConstantLevel::Constant);
        }
        let prev = self.current_function.replace(id);
        let result = self.type_slot(id, body);
        self.current_function = prev;
        result.map(|_| ())
    }

    fn type_return(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(expr) = self.ast.get::<bgn_ir::Return>(id).and_then(|r| r.expr) else {
            return Ok(());
        };
        let expr = self.type_slot(id, expr)?;
        let return_type = self
            .current_function
            .and_then(|f| self.ast.get::<Function>(f))
            .and_then(|f| f.return_type);
        if let Some(r) = self.ast.get_mut::<bgn_ir::Return>(id) {
            r.related_function = self.current_function;
        }
        let (Some(rt), Some(_)) = (return_type, self.ast.expr_type(expr)) else {
            return Ok(());
        };
        self.fit_to(expr, rt)?;
        let et = self.ast.expr_type(expr).unwrap_or(rt);
        if !equal_type(self.ast, et, rt) {
            return Err(self.error(
                ErrorCode::E2001,
                expr,
                format!(
                    "return type mismatch: expected {} but got {}",
                    self.type_name(rt),
                    self.type_name(et)
                ),
            ));
        }
        Ok(())
    }

    fn type_loop(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(lp) = self.ast.get::<Loop>(id) else {
            return Ok(());
        };
        let (init, cond, step, body) = (lp.init, lp.cond, lp.step, lp.body);
        if let Some(init) = init {
            self.type_slot(id, init)?;
        }
        if let Some(cond) = cond {
            let cond = self.type_slot(id, cond)?;
            self.require_bool(cond, "loop condition")?;
        }
        if let Some(step) = step {
            self.type_slot(id, step)?;
        }
        self.type_slot(id, body)?;
        Ok(())
    }
}
