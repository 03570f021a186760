//! Field declarations: the field type, the parenthesized arguments after
//! it, and the length of an array field sized by another field.
//!
//! Arguments split into directives (`input.align = 8`, `config.type = T`,
//! `input.subrange(len)` ...) and plain expressions. A plain argument is a
//! fixed value the field must hold, either for the field as a whole or for
//! each element of an array field.

use bgn_diagnostic::ErrorCode;
use bgn_eval::{Evaluator, LinearResolver};
use bgn_ir::{
    extract_config, ArrayType, ConstantLevel, ExtractMode, Field, FieldArgument,
    FieldArgumentMapping, Ident, IdentUsage, MemberAccess, Metadata, NodeId, NodeType,
};

use crate::relations::{comparable_type, resolve_alias};
use crate::{Typing, TypeResult};

/// Directive slots gathered from a field's arguments.
#[derive(Default)]
struct Directives {
    assigns: Vec<NodeId>,
    alignment: Option<NodeId>,
    alignment_value: Option<u64>,
    sub_byte_length: Option<NodeId>,
    sub_byte_begin: Option<NodeId>,
    sub_byte_expr: Option<NodeId>,
    peek: Option<NodeId>,
    peek_value: Option<u64>,
    type_map: Option<NodeId>,
    metadata: Vec<NodeId>,
}

impl Typing<'_> {
    pub(crate) fn type_field(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(f) = self.ast.get::<Field>(id) else {
            return Ok(());
        };
        let (ident, field_type, arguments) = (f.ident, f.field_type, f.arguments);
        if ident.is_some_and(|i| self.ast.expr_type(i).is_some()) || !self.resolving.insert(id) {
            return Ok(());
        }
        let result = self.type_field_parts(id, ident, field_type, arguments);
        self.resolving.remove(&id);
        result
    }

    fn type_field_parts(
        &mut self,
        id: NodeId,
        ident: Option<NodeId>,
        field_type: NodeId,
        arguments: Option<NodeId>,
    ) -> TypeResult<()> {
        let field_type = self.type_slot(id, field_type)?;
        if let Some(ident) = ident {
            self.set_type(ident, field_type, ConstantLevel::ImmutableVariable);
        }
        if let Some(arguments) = arguments {
            self.type_field_arguments(arguments, field_type)?;
        }
        self.solve_length(id, field_type);
        Ok(())
    }

    fn type_field_arguments(&mut self, args: NodeId, field_type: NodeId) -> TypeResult<()> {
        let Some(fa) = self.ast.get::<FieldArgument>(args) else {
            return Ok(());
        };
        if fa.processed {
            return Ok(());
        }
        let collected = fa.collected_arguments.clone();
        let mut directives = Directives::default();
        let mut plain = Vec::new();
        for arg in collected {
            if extract_config(self.ast, arg, ExtractMode::Both).is_some() {
                self.type_directive(arg, &mut directives)?;
            } else {
                plain.push(self.type_slot(args, arg)?);
            }
        }
        let mut values = Vec::with_capacity(plain.len());
        let mut mapping = FieldArgumentMapping::empty();
        for arg in plain {
            if self.ast.node_type(arg) == NodeType::TypeLiteral {
                self.set_type_map(&mut directives, arg)?;
                continue;
            }
            if self.ast.expr_type(arg).is_none() {
                self.skip_untyped(arg, arg);
                continue;
            }
            mapping |= self.map_fixed_value(arg, field_type)?;
            values.push(arg);
        }
        if values.len() > 1 {
            mapping |= FieldArgumentMapping::SOME_CANDIDATE;
        }
        tracing::trace!(?args, ?mapping, "field arguments");
        if let Some(fa) = self.ast.get_mut::<FieldArgument>(args) {
            fa.arguments = values;
            fa.assigns = directives.assigns;
            fa.alignment = directives.alignment;
            fa.alignment_value = directives.alignment_value;
            fa.sub_byte_length = directives.sub_byte_length;
            fa.sub_byte_begin = directives.sub_byte_begin;
            fa.sub_byte_expr = directives.sub_byte_expr;
            fa.peek = directives.peek;
            fa.peek_value = directives.peek_value;
            fa.type_map = directives.type_map;
            fa.metadata = directives.metadata;
            fa.argument_mapping = mapping;
            fa.processed = true;
        }
        Ok(())
    }

    fn type_directive(&mut self, arg: NodeId, directives: &mut Directives) -> TypeResult<()> {
        let Some(desc) = extract_config(self.ast, arg, ExtractMode::Both) else {
            return Ok(());
        };
        let mut values = Vec::with_capacity(desc.arguments.len());
        for v in desc.arguments {
            values.push(self.type_slot(arg, v)?);
        }
        if let Some(member) = self.ast.get::<MemberAccess>(desc.target).map(|m| m.member) {
            if let Some(i) = self.ast.get_mut::<Ident>(member) {
                i.usage = IdentUsage::ReferenceBuiltinFn;
            }
        }
        if desc.assign_style {
            directives.assigns.push(arg);
        }
        let first = values.first().copied();
        let evaluator = Evaluator::resolve_ident();
        match desc.name.as_str() {
            "input.align" => {
                directives.alignment = first;
                directives.alignment_value = first.and_then(|v| evaluator.eval_int(self.ast, v).ok());
            }
            "input.peek" => {
                directives.peek = first;
                directives.peek_value = first
                    .and_then(|v| evaluator.eval(self.ast, v).ok())
                    .and_then(|v| v.as_int().or_else(|| v.as_bool().map(u64::from)));
            }
            "config.type" => match first {
                Some(v) if self.ast.node_type(v) == NodeType::TypeLiteral => {
                    self.set_type_map(directives, v)?;
                }
                _ => {
                    return Err(self.error(
                        ErrorCode::E4001,
                        arg,
                        "config.type must be a type literal",
                    ))
                }
            },
            "input" => directives.sub_byte_expr = first,
            "input.subrange" => {
                if !(1..=2).contains(&values.len()) {
                    return Err(self.error(
                        ErrorCode::E4004,
                        arg,
                        format!("input.subrange takes 1 or 2 arguments but got {}", values.len()),
                    ));
                }
                directives.sub_byte_length = first;
                directives.sub_byte_begin = values.get(1).copied();
            }
            _ => {
                let copies = values.iter().map(|&v| self.ast.deep_copy(v)).collect();
                let metadata = self.alloc_at(
                    arg,
                    Metadata {
                        base: Some(arg),
                        name: desc.name,
                        values: copies,
                    },
                );
                directives.metadata.push(metadata);
            }
        }
        Ok(())
    }

    fn set_type_map(&self, directives: &mut Directives, literal: NodeId) -> TypeResult<()> {
        if directives.type_map.is_some() {
            return Err(self.error(
                ErrorCode::E4002,
                literal,
                "type mapping is specified more than once",
            ));
        }
        directives.type_map = Some(literal);
        Ok(())
    }

    /// Decide whether a fixed value is the field's value or each element's.
    fn map_fixed_value(&mut self, arg: NodeId, field_type: NodeId) -> TypeResult<FieldArgumentMapping> {
        self.fit_to(arg, field_type)?;
        let arg_ty = self.ast.expr_type(arg).unwrap_or(field_type);
        if comparable_type(self.ast, field_type, arg_ty) {
            return Ok(FieldArgumentMapping::DIRECT);
        }
        let element = self
            .ast
            .get::<ArrayType>(resolve_alias(self.ast, field_type))
            .map(|a| a.element_type);
        if let Some(element) = element {
            self.fit_to(arg, element)?;
            let arg_ty = self.ast.expr_type(arg).unwrap_or(element);
            if comparable_type(self.ast, element, arg_ty) {
                return Ok(FieldArgumentMapping::REPEAT);
            }
            return Err(self.error(
                ErrorCode::E4003,
                arg,
                format!(
                    "cannot decide fixed value argument; expect {} or {} but got {}",
                    self.type_name(field_type),
                    self.type_name(element),
                    self.type_name(arg_ty)
                ),
            ));
        }
        Err(self.error(
            ErrorCode::E4003,
            arg,
            format!(
                "cannot decide fixed value argument; expect {} but got {}",
                self.type_name(field_type),
                self.type_name(arg_ty)
            ),
        ))
    }

    /// For `data :[len * 2]u8`, derive `len` from a known element count so
    /// an encoder can fill in the length field.
    fn solve_length(&mut self, field: NodeId, field_type: NodeId) {
        let Some(arr) = self.ast.get::<ArrayType>(field_type) else {
            return;
        };
        let Some(length) = arr.length.filter(|_| arr.length_value.is_none()) else {
            return;
        };
        if self.level(length) == ConstantLevel::Constant {
            return;
        }
        let resolver = LinearResolver::new(self.fresh_tmp());
        let Ok(ident) = resolver.find_ident(self.ast, length) else {
            return;
        };
        let def = self.ast.definition_ident(ident);
        let names_field = self
            .ast
            .get::<Ident>(def)
            .and_then(|d| d.base)
            .is_some_and(|b| self.ast.is::<Field>(b));
        if !names_field {
            return;
        }
        match resolver.resolve(self.ast, length) {
            Ok(solution) => {
                tracing::debug!(?field, "array length solved for its length field");
                self.length_solutions.insert(field, solution);
            }
            Err(err) => tracing::trace!(?field, %err, "array length is not invertible"),
        }
    }
}
