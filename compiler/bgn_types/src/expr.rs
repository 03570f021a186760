//! Expression typing.
//!
//! Every expression ends with an `expr_type` and a constant level, or is
//! left untyped with a W0001 warning when an operand could not be typed
//! (a name that only a later pass resolves). Errors are reserved for
//! operands whose types are known and do not go together.

use bgn_diagnostic::ErrorCode;
use bgn_eval::Evaluator;
use bgn_ir::{
    config_name, member_name, ArrayType, Binary, BinaryOp, Call, Cast, CharLiteral,
    ConstantLevel, Enum, EnumMember, Field, FunctionType, IOMethod, IOOperation, Ident,
    IdentType, IdentUsage, Identity, Import, Index, IntLiteralType, MemberAccess, NodeId,
    NodeKind, NodeType, OrCond, Paren, Program, Range, RangeType, RegexLiteralType,
    SpecifyOrder, StrLiteralType, StructType, TypeLayout, TypeLiteral, Unary, UnaryOp,
};

use crate::relations::{aligned_bit, comparable_type, equal_type, resolve_alias};
use crate::{Typing, TypeResult};

impl Typing<'_> {
    pub(crate) fn type_expr(&mut self, id: NodeId) -> TypeResult<NodeId> {
        match self.ast.node_type(id) {
            NodeType::IntLiteral => {
                let ty = self.alloc_at(id, IntLiteralType { base: id });
                self.set_type(id, ty, ConstantLevel::Constant);
            }
            NodeType::BoolLiteral => {
                let ty = self.alloc_at(id, NodeKind::BoolType);
                self.set_type(id, ty, ConstantLevel::Constant);
            }
            NodeType::StrLiteral => {
                let ty = self.alloc_at(id, StrLiteralType { base: id });
                self.set_type(id, ty, ConstantLevel::Constant);
            }
            NodeType::RegexLiteral => {
                let ty = self.alloc_at(id, RegexLiteralType { base: id });
                self.set_type(id, ty, ConstantLevel::Constant);
            }
            NodeType::CharLiteral => {
                let code = self.ast.get::<CharLiteral>(id).map_or(0, |c| c.code);
                let bits = u64::from(64 - code.leading_zeros()).max(1);
                let ty = self.int_type_at(id, aligned_bit(bits), false);
                self.set_type(id, ty, ConstantLevel::Constant);
            }
            NodeType::TypeLiteral => {
                if let Some(inner) = self.ast.get::<TypeLiteral>(id).map(|t| t.type_literal) {
                    self.type_slot(id, inner)?;
                }
                let meta = self.alloc_at(id, NodeKind::MetaType);
                self.set_type(id, meta, ConstantLevel::Constant);
            }
            NodeType::Ident => return self.type_ident(id),
            NodeType::Binary => return self.type_binary(id),
            NodeType::Unary => self.type_unary(id)?,
            NodeType::Cond => self.type_cond(id)?,
            NodeType::Paren | NodeType::Identity => self.type_wrapper(id)?,
            NodeType::Call => return self.type_call(id),
            NodeType::MemberAccess => return self.type_member_access(id),
            NodeType::Index => self.type_index(id)?,
            NodeType::Range => self.type_range(id)?,
            NodeType::If => self.type_if(id)?,
            NodeType::Match => self.type_match(id)?,
            NodeType::IOOperation => self.type_io_operation(id)?,
            NodeType::OrCond => self.type_or_cond(id)?,
            NodeType::Cast => self.type_cast(id)?,
            NodeType::Available => {
                self.type_children(id)?;
                let ty = self.alloc_at(id, NodeKind::BoolType);
                self.set_type(id, ty, ConstantLevel::Variable);
            }
            NodeType::ExplicitError => {
                self.type_children(id)?;
                let void = self.alloc_at(id, NodeKind::VoidType);
                self.set_type(id, void, ConstantLevel::Variable);
            }
            NodeType::SpecifyOrder => self.type_specify_order(id)?,
            NodeType::Import => self.type_import(id)?,
            // `input`/`output`/`config` and desugaring temporaries carry no type.
            _ => {}
        }
        Ok(id)
    }

    fn untyped_operand(&mut self, at: NodeId, operands: &[NodeId]) -> bool {
        match operands.iter().find(|&&o| self.ast.expr_type(o).is_none()) {
            Some(&operand) => {
                self.skip_untyped(at, operand);
                true
            }
            None => false,
        }
    }

    fn is_numeric(&self, ty: NodeId) -> bool {
        let resolved = resolve_alias(self.ast, ty);
        matches!(
            self.ast.node_type(resolved),
            NodeType::IntType | NodeType::IntLiteralType | NodeType::FloatType
        )
    }

    fn is_integer(&self, ty: NodeId) -> bool {
        let resolved = resolve_alias(self.ast, ty);
        matches!(
            self.ast.node_type(resolved),
            NodeType::IntType | NodeType::IntLiteralType
        )
    }

    fn is_bool(&self, ty: NodeId) -> bool {
        self.ast.node_type(ty) == NodeType::BoolType
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    fn type_binary(&mut self, id: NodeId) -> TypeResult<NodeId> {
        let Some(&Binary { op, left, right }) = self.ast.get::<Binary>(id) else {
            return Ok(id);
        };
        if op.is_assign() {
            self.type_assign(id)?;
            return Ok(id);
        }
        let left = self.type_slot(id, left)?;
        let right = self.type_slot(id, right)?;
        if self.untyped_operand(id, &[left, right]) {
            return Ok(id);
        }
        let level = self.level(left).combine(self.level(right));
        if op == BinaryOp::Comma {
            if let Some(ty) = self.ast.expr_type(right) {
                self.set_type(id, ty, level);
            }
            return Ok(id);
        }
        self.fit(left, right)?;
        let (Some(lt), Some(rt)) = (self.ast.expr_type(left), self.ast.expr_type(right)) else {
            return Ok(id);
        };
        let ty = self.binary_result(op, id, lt, rt);
        let Some(ty) = ty else {
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
        self.set_type(id, ty, level);
        Ok(id)
    }

    pub(crate) fn binary_result(&mut self, op: BinaryOp, at: NodeId, lt: NodeId, rt: NodeId) -> Option<NodeId> {
        match op {
            // Shifts included: `u8 << u32` is a `u32`.
            _ if op.is_arithmetic() => self.common_type(lt, rt),
            _ if op.is_bitwise() => (self.is_integer(lt)
                && self.is_integer(rt)
                && equal_type(self.ast, lt, rt))
            .then_some(lt),
            _ if op.is_compare() => {
                if !comparable_type(self.ast, lt, rt) {
                    return None;
                }
                Some(self.alloc_at(at, NodeKind::BoolType))
            }
            _ if op.is_logical() => (self.is_bool(lt) && self.is_bool(rt)).then_some(lt),
            _ => None,
        }
    }

    fn type_unary(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(&Unary { op, expr }) = self.ast.get::<Unary>(id) else {
            return Ok(());
        };
        let expr = self.type_slot(id, expr)?;
        let Some(ty) = self.ast.expr_type(expr) else {
            self.skip_untyped(id, expr);
            return Ok(());
        };
        let valid = match op {
            UnaryOp::Not => self.is_bool(ty) || self.is_integer(ty),
            UnaryOp::MinusSign => self.is_numeric(ty),
        };
        if !valid {
            return Err(self.error(
                ErrorCode::E2002,
                id,
                format!("unary op {} is not valid for {}", op.as_symbol(), self.type_name(ty)),
            ));
        }
        let level = self.level(expr);
        self.set_type(id, ty, level);
        Ok(())
    }

    fn type_cond(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(c) = self.ast.get::<bgn_ir::Cond>(id) else {
            return Ok(());
        };
        let (cond, then, els) = (c.cond, c.then, c.els);
        let cond = self.type_slot(id, cond)?;
        let then = self.type_slot(id, then)?;
        let els = self.type_slot(id, els)?;
        if self.untyped_operand(id, &[cond, then, els]) {
            return Ok(());
        }
        self.require_bool(cond, "condition of conditional operator")?;
        self.fit(then, els)?;
        let (Some(tt), Some(et)) = (self.ast.expr_type(then), self.ast.expr_type(els)) else {
            return Ok(());
        };
        let Some(ty) = self.common_type(tt, et) else {
            return Err(self.error(
                ErrorCode::E2001,
                id,
                format!(
                    "branches of conditional operator have different types: {} and {}",
                    self.type_name(tt),
                    self.type_name(et)
                ),
            ));
        };
        let level = self
            .level(cond)
            .combine(self.level(then))
            .combine(self.level(els));
        self.set_type(id, ty, level);
        Ok(())
    }

    fn type_wrapper(&mut self, id: NodeId) -> TypeResult<()> {
        let inner = match self.ast.kind(id) {
            NodeKind::Paren(Paren { expr }) | NodeKind::Identity(Identity { expr }) => *expr,
            _ => return Ok(()),
        };
        let inner = self.type_slot(id, inner)?;
        if let Some(ty) = self.ast.expr_type(inner) {
            let level = self.level(inner);
            self.set_type(id, ty, level);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Calls and casts
    // ------------------------------------------------------------------

    fn type_call(&mut self, id: NodeId) -> TypeResult<NodeId> {
        let Some(call) = self.ast.get::<Call>(id) else {
            return Ok(id);
        };
        let (callee, arguments) = (call.callee, call.arguments.clone());
        // Directives not lowered yet (`input.get(...)`, `config.import(...)`).
        if config_name(self.ast, callee).is_some() {
            return Ok(id);
        }
        let callee = self.type_slot(id, callee)?;
        if let Some(target) = self.ast.get::<TypeLiteral>(callee).map(|t| t.type_literal) {
            let cast = self.alloc_at(
                id,
                Cast {
                    base: Some(id),
                    arguments,
                },
            );
            self.ast.node_mut(cast).expr_type = Some(target);
            self.type_cast(cast)?;
            return Ok(cast);
        }
        let mut args = Vec::with_capacity(arguments.len());
        for a in arguments {
            args.push(self.type_slot(id, a)?);
        }
        let Some(callee_ty) = self.ast.expr_type(callee) else {
            self.skip_untyped(id, callee);
            return Ok(id);
        };
        let Some(ft) = self.ast.get::<FunctionType>(callee_ty) else {
            return Err(self.error(
                ErrorCode::E2006,
                id,
                format!("{} is not callable", self.type_name(callee_ty)),
            ));
        };
        let (params, return_type) = (ft.parameters.clone(), ft.return_type);
        if params.len() != args.len() {
            return Err(self.error(
                ErrorCode::E2006,
                id,
                format!(
                    "function expects {} arguments but got {}",
                    params.len(),
                    args.len()
                ),
            ));
        }
        for (i, (&arg, &param)) in args.iter().zip(&params).enumerate() {
            if self.ast.expr_type(arg).is_none() {
                self.skip_untyped(id, arg);
                continue;
            }
            self.fit_to(arg, param)?;
            let at = self.ast.expr_type(arg).unwrap_or(param);
            if !equal_type(self.ast, at, param) {
                return Err(self.error(
                    ErrorCode::E2001,
                    arg,
                    format!(
                        "argument {} type mismatch: expected {} but got {}",
                        i + 1,
                        self.type_name(param),
                        self.type_name(at)
                    ),
                ));
            }
        }
        let ty = match return_type {
            Some(rt) => rt,
            None => self.alloc_at(id, NodeKind::VoidType),
        };
        self.set_type(id, ty, ConstantLevel::Variable);
        Ok(id)
    }

    /// A conversion `T(x)`: at most one argument, and `T` must be an
    /// integer, enum, bool or struct type.
    fn type_cast(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(cast) = self.ast.get::<Cast>(id) else {
            return Ok(());
        };
        let (base, arguments) = (cast.base, cast.arguments.clone());
        for a in &arguments {
            self.type_slot(id, *a)?;
        }
        let arguments = self
            .ast
            .get::<Cast>(id)
            .map(|c| c.arguments.clone())
            .unwrap_or_default();
        let target = self.ast.expr_type(id).or_else(|| {
            let callee = self.ast.get::<Call>(base?)?.callee;
            self.ast.get::<TypeLiteral>(callee).map(|t| t.type_literal)
        });
        let Some(target) = target else {
            return Ok(());
        };
        let resolved = resolve_alias(self.ast, target);
        let castable = matches!(
            self.ast.node_type(resolved),
            NodeType::IntType | NodeType::EnumType | NodeType::StructType | NodeType::BoolType
        );
        if !castable {
            return Err(self.error(
                ErrorCode::E2007,
                id,
                format!("cannot cast to {}", self.type_name(target)),
            ));
        }
        if arguments.len() > 1 {
            return Err(self.error(
                ErrorCode::E2007,
                id,
                format!(
                    "cast to {} takes at most one argument but got {}",
                    self.type_name(target),
                    arguments.len()
                ),
            ));
        }
        let level = match arguments.first() {
            Some(&arg) => {
                self.fit_to(arg, target)?;
                self.level(arg)
            }
            None => ConstantLevel::Constant,
        };
        self.set_type(id, target, level);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Member access and indexing
    // ------------------------------------------------------------------

    fn type_member_access(&mut self, id: NodeId) -> TypeResult<NodeId> {
        if config_name(self.ast, id).is_some() {
            return Ok(id);
        }
        let Some(&MemberAccess { target, member, .. }) = self.ast.get::<MemberAccess>(id) else {
            return Ok(id);
        };
        let name = self.ast.ident_name(member).unwrap_or_default().to_string();
        let target = self.type_slot(id, target)?;
        if let Some(inner) = self.ast.get::<TypeLiteral>(target).map(|t| t.type_literal) {
            return self.type_enum_member_access(id, inner, member, &name);
        }
        let Some(target_ty) = self.ast.expr_type(target) else {
            self.skip_untyped(id, target);
            return Ok(id);
        };
        let level = self.level(target);
        let resolved = resolve_alias(self.ast, target_ty);
        match self.ast.kind(resolved) {
            NodeKind::StructType(st) => {
                let found = st
                    .fields
                    .iter()
                    .copied()
                    .find(|&f| member_name(self.ast, f) == Some(name.as_str()));
                if let Some(def) = found {
                    return self.bind_struct_member(id, member, def, level);
                }
            }
            NodeKind::ArrayType(_) if name == "length" => {
                let level = level.combine(ConstantLevel::ImmutableVariable);
                if let Some(i) = self.ast.get_mut::<Ident>(member) {
                    i.usage = IdentUsage::ReferenceBuiltinFn;
                }
                let ty = self.int_type_at(id, 64, false);
                self.set_type(id, ty, level);
                return Ok(id);
            }
            _ => {}
        }
        Err(self.error(
            ErrorCode::E2008,
            member,
            format!("{} has no member named {name}", self.type_name(target_ty)),
        ))
    }

    fn bind_struct_member(
        &mut self,
        id: NodeId,
        member: NodeId,
        def: NodeId,
        level: ConstantLevel,
    ) -> TypeResult<NodeId> {
        let def_ident = match self.ast.kind(def) {
            NodeKind::Field(Field { ident, .. }) => *ident,
            NodeKind::Format(f) => Some(f.ident),
            NodeKind::State(s) => Some(s.ident),
            NodeKind::Enum(e) => Some(e.ident),
            NodeKind::Function(f) => Some(f.ident),
            _ => None,
        };
        if matches!(self.ast.node_type(def), NodeType::Format | NodeType::State | NodeType::Enum) {
            // `module.Name` names a type.
            let name = self.ast.ident_name(member).unwrap_or_default().to_string();
            let ident = self.alloc_at(
                member,
                Ident {
                    ident: name,
                    usage: IdentUsage::ReferenceType,
                    base: def_ident,
                    scope: None,
                },
            );
            let ident_type = self.alloc_at(
                id,
                IdentType {
                    ident,
                    base: Some(def),
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
        if let Some(i) = self.ast.get_mut::<Ident>(member) {
            i.usage = IdentUsage::ReferenceMember;
            i.base = def_ident;
        }
        if let Some(ma) = self.ast.get_mut::<MemberAccess>(id) {
            ma.base = Some(def);
        }
        if let Some(d) = def_ident.filter(|_| self.ast.is::<Field>(def)) {
            self.ensure_typed_definition(d)?;
        }
        let ty = match self.ast.kind(def) {
            NodeKind::Field(f) => Some(f.field_type),
            NodeKind::Function(f) => f.func_type,
            _ => None,
        };
        if let Some(ty) = ty {
            self.set_type(id, ty, level.combine(ConstantLevel::ImmutableVariable));
        }
        Ok(id)
    }

    /// `Enum.Member`
    fn type_enum_member_access(
        &mut self,
        id: NodeId,
        type_node: NodeId,
        member: NodeId,
        name: &str,
    ) -> TypeResult<NodeId> {
        let enum_ = self
            .ast
            .get::<IdentType>(type_node)
            .and_then(|t| t.base)
            .filter(|&b| self.ast.is::<Enum>(b));
        let Some(enum_) = enum_ else {
            return Err(self.error(
                ErrorCode::E2008,
                member,
                format!("{} has no member named {name}", self.type_name(type_node)),
            ));
        };
        let (members, enum_type) = match self.ast.get::<Enum>(enum_) {
            Some(e) => (e.members.clone(), e.enum_type),
            None => return Ok(id),
        };
        let found = members.into_iter().find(|&m| {
            self.ast
                .get::<EnumMember>(m)
                .is_some_and(|em| self.ast.ident_name(em.ident) == Some(name))
        });
        let Some(found) = found else {
            return Err(self.error(
                ErrorCode::E2008,
                member,
                format!("enum {} has no member named {name}", self.type_name(type_node)),
            ));
        };
        let member_ident = self.ast.get::<EnumMember>(found).map(|m| m.ident);
        if let Some(i) = self.ast.get_mut::<Ident>(member) {
            i.usage = IdentUsage::ReferenceMember;
            i.base = member_ident;
        }
        if let Some(ma) = self.ast.get_mut::<MemberAccess>(id) {
            ma.base = Some(found);
        }
        if let Some(et) = enum_type {
            self.set_type(id, et, ConstantLevel::Constant);
        }
        Ok(id)
    }

    fn type_index(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(&Index { expr, index }) = self.ast.get::<Index>(id) else {
            return Ok(());
        };
        let expr = self.type_slot(id, expr)?;
        let index = self.type_slot(id, index)?;
        if self.untyped_operand(id, &[expr, index]) {
            return Ok(());
        }
        let (Some(ty), Some(index_ty)) = (self.ast.expr_type(expr), self.ast.expr_type(index))
        else {
            return Ok(());
        };
        if !self.is_integer(index_ty) {
            return Err(self.error(
                ErrorCode::E2009,
                index,
                format!("index must be an integer but got {}", self.type_name(index_ty)),
            ));
        }
        let resolved = resolve_alias(self.ast, ty);
        let element = match self.ast.kind(resolved) {
            NodeKind::ArrayType(a) => a.element_type,
            NodeKind::StrLiteralType(_) => self.int_type_at(id, 8, false),
            _ => {
                return Err(self.error(
                    ErrorCode::E2009,
                    id,
                    format!("cannot index into {}", self.type_name(ty)),
                ))
            }
        };
        let level = self.level(expr).combine(self.level(index));
        self.set_type(id, element, level);
        Ok(())
    }

    fn type_range(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(&Range { start, end, .. }) = self.ast.get::<Range>(id) else {
            return Ok(());
        };
        let start = match start {
            Some(s) => Some(self.type_slot(id, s)?),
            None => None,
        };
        let end = match end {
            Some(e) => Some(self.type_slot(id, e)?),
            None => None,
        };
        let endpoints: Vec<NodeId> = start.into_iter().chain(end).collect();
        if self.untyped_operand(id, &endpoints) {
            return Ok(());
        }
        let base_type = match (start, end) {
            (Some(s), Some(e)) => {
                self.fit(s, e)?;
                let (Some(st), Some(et)) = (self.ast.expr_type(s), self.ast.expr_type(e)) else {
                    return Ok(());
                };
                if !equal_type(self.ast, st, et) {
                    return Err(self.error(
                        ErrorCode::E2011,
                        id,
                        format!(
                            "range endpoints have different types: {} and {}",
                            self.type_name(st),
                            self.type_name(et)
                        ),
                    ));
                }
                Some(st)
            }
            (Some(x), None) | (None, Some(x)) => self.ast.expr_type(x),
            (None, None) => None,
        };
        let level = endpoints
            .iter()
            .fold(ConstantLevel::Constant, |acc, &e| acc.combine(self.level(e)));
        let ty = self.alloc_at(
            id,
            RangeType {
                base_type,
                range: Some(id),
            },
        );
        self.set_type(id, ty, level);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    fn type_io_operation(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(io) = self.ast.get::<IOOperation>(id) else {
            return Ok(());
        };
        let (method, arguments) = (io.method, io.arguments.clone());
        for a in &arguments {
            self.type_slot(id, *a)?;
        }
        let arguments = self
            .ast
            .get::<IOOperation>(id)
            .map(|io| io.arguments.clone())
            .unwrap_or_default();
        let (ty, level) = match method {
            IOMethod::InputOffset | IOMethod::InputBitOffset | IOMethod::InputRemain => (
                self.int_type_at(id, 64, false),
                ConstantLevel::ImmutableVariable,
            ),
            IOMethod::OutputPut | IOMethod::InputBackward => {
                (self.alloc_at(id, NodeKind::VoidType), ConstantLevel::Variable)
            }
            IOMethod::InputGet | IOMethod::InputPeek => {
                if arguments.len() > 2 {
                    return Err(self.error(
                        ErrorCode::E2010,
                        id,
                        format!(
                            "{} takes at most 2 arguments but got {}",
                            method.as_name(),
                            arguments.len()
                        ),
                    ));
                }
                let requested = arguments
                    .first()
                    .and_then(|&a| self.ast.get::<TypeLiteral>(a))
                    .map(|t| t.type_literal);
                let ty = match requested {
                    Some(t) => t,
                    None => self.int_type_at(id, 8, false),
                };
                (ty, ConstantLevel::Variable)
            }
            IOMethod::InputSubrange => {
                if !(1..=2).contains(&arguments.len()) {
                    return Err(self.error(
                        ErrorCode::E2010,
                        id,
                        format!(
                            "{} takes 1 or 2 arguments but got {}",
                            method.as_name(),
                            arguments.len()
                        ),
                    ));
                }
                let element_type = self.int_type_at(id, 8, false);
                let ty = self.alloc_at(
                    id,
                    ArrayType {
                        element_type,
                        length: None,
                        length_value: None,
                        is_explicit: false,
                        layout: TypeLayout::default(),
                    },
                );
                (ty, ConstantLevel::Variable)
            }
            m if m.is_config_flag() => {
                (self.alloc_at(id, NodeKind::BoolType), ConstantLevel::Constant)
            }
            _ => return Ok(()),
        };
        self.set_type(id, ty, level);
        Ok(())
    }

    /// `a | b | c` in a match pattern.
    fn type_or_cond(&mut self, id: NodeId) -> TypeResult<()> {
        let conds = self
            .ast
            .get::<OrCond>(id)
            .map(|o| o.cond.clone())
            .unwrap_or_default();
        let mut typed = Vec::with_capacity(conds.len());
        for c in conds {
            typed.push(self.type_slot(id, c)?);
        }
        if self.untyped_operand(id, &typed) {
            return Ok(());
        }
        let mut common: Option<NodeId> = None;
        for &c in &typed {
            let Some(ty) = self.ast.expr_type(c) else {
                continue;
            };
            let ty = self.range_base(ty).unwrap_or(ty);
            common = Some(match common {
                None => ty,
                Some(acc) => match self.common_type(acc, ty) {
                    Some(t) => t,
                    None => {
                        return Err(self.error(
                            ErrorCode::E2001,
                            c,
                            format!(
                                "alternatives have incompatible types: {} and {}",
                                self.type_name(acc),
                                self.type_name(ty)
                            ),
                        ))
                    }
                },
            });
        }
        let level = typed
            .iter()
            .fold(ConstantLevel::Constant, |acc, &c| acc.combine(self.level(c)));
        if let Some(ty) = common {
            self.set_type(id, ty, level);
        }
        Ok(())
    }

    fn range_base(&self, ty: NodeId) -> Option<NodeId> {
        self.ast.get::<RangeType>(ty).and_then(|r| r.base_type)
    }

    fn type_specify_order(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(order) = self.ast.get::<SpecifyOrder>(id).map(|s| s.order) else {
            return Ok(());
        };
        let order = self.type_slot(id, order)?;
        let value = Evaluator::resolve_ident().eval_int(self.ast, order).ok();
        tracing::trace!(?id, ?value, "order directive");
        if let Some(s) = self.ast.get_mut::<SpecifyOrder>(id) {
            s.order_value = value;
        }
        let void = self.alloc_at(id, NodeKind::VoidType);
        self.set_type(id, void, ConstantLevel::Constant);
        Ok(())
    }

    fn type_import(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(desc) = self.ast.get::<Import>(id).map(|i| i.import_desc) else {
            return Ok(());
        };
        self.type_slot(id, desc)?;
        let struct_type = self.ast.get::<Program>(desc).and_then(|p| p.struct_type);
        if let Some(st) = struct_type.filter(|&st| self.ast.is::<StructType>(st)) {
            self.set_type(id, st, ConstantLevel::Constant);
        }
        Ok(())
    }
}
