//! Programmatic construction of a parsed program.
//!
//! [`AstBuilder`] does what the parser does after tokenizing: it allocates
//! nodes with monotonically increasing locations, registers every
//! identifier occurrence in the current scope segment, marks definitions
//! with their usage and `base`, and opens/closes scope branches around
//! nested blocks. Desugaring and typing are left to later passes.

use crate::escape::unescape;
use crate::node::{
    ArrayType, Binary, BoolLiteral, Call, CharLiteral, Cond, Enum, EnumMember, EnumType, Field,
    FieldArgument, FloatType, Format, Function, FunctionType, Ident, IdentType, Identity, If,
    IndentBlock, IntLiteral, IntType, Loop, Match, MatchBranch, MemberAccess, NodeKind, Paren,
    Program, Range, RegexLiteral, ScopedStatement, SpecialLiteral, State, StrLiteral,
    StructType, TypeLayout, TypeLiteral, Unary,
};
use crate::ops::{BinaryOp, BlockTrait, IdentUsage, SpecialLiteralKind, UnaryOp};
use crate::scope::Scope;
use crate::{Ast, Loc, NodeId, ScopeId, Span};

/// One `cond => body` arm for [`AstBuilder::match_expr`].
pub struct Arm<'a> {
    cond: NodeId,
    body: Box<dyn FnOnce(&mut AstBuilder) -> NodeId + 'a>,
}

impl<'a> Arm<'a> {
    pub fn new(cond: NodeId, body: impl FnOnce(&mut AstBuilder) -> NodeId + 'a) -> Self {
        Arm {
            cond,
            body: Box::new(body),
        }
    }
}

pub struct AstBuilder {
    ast: Ast,
    file: u32,
    offset: u32,
    line: u32,
    line_start: u32,
    global: ScopeId,
    current: ScopeId,
    entered_from: Vec<ScopeId>,
    /// Statement lists of the open blocks, innermost last.
    blocks: Vec<Vec<NodeId>>,
    /// Members whose bodies are being built, innermost last.
    owners: Vec<NodeId>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::for_file(Ast::new(), 0)
    }

    /// Continue building into an existing arena, attributing new nodes to
    /// `file`. Used when loading imports.
    pub fn for_file(mut ast: Ast, file: u32) -> Self {
        let global = ast.alloc_scope(Scope::default());
        AstBuilder {
            ast,
            file,
            offset: 0,
            line: 1,
            line_start: 0,
            global,
            current: global,
            entered_from: Vec::new(),
            blocks: vec![Vec::new()],
            owners: Vec::new(),
        }
    }

    /// Read access while building.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Start a new source line.
    pub fn newline(&mut self) {
        self.offset += 1;
        self.line += 1;
        self.line_start = self.offset;
    }

    fn next_loc(&mut self) -> Loc {
        let start = self.offset;
        self.offset += 1;
        Loc::new(
            Span::new(start, start + 1),
            self.file,
            self.line,
            start - self.line_start + 1,
        )
    }

    fn alloc(&mut self, kind: impl Into<NodeKind>) -> NodeId {
        let loc = self.next_loc();
        self.ast.alloc(loc, kind)
    }

    /// Append a statement to the innermost open block.
    pub fn push(&mut self, stmt: NodeId) -> NodeId {
        if let Some(block) = self.blocks.last_mut() {
            block.push(stmt);
        }
        stmt
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    fn enter_branch(&mut self, owner: Option<NodeId>) -> ScopeId {
        let id = self.ast.alloc_scope(Scope {
            owner,
            prev: Some(self.current),
            branch_root: true,
            ..Scope::default()
        });
        self.ast.scope_mut(self.current).branch = Some(id);
        self.entered_from.push(self.current);
        self.current = id;
        id
    }

    fn leave_branch(&mut self) {
        let Some(from) = self.entered_from.pop() else {
            return;
        };
        let owner = self.ast.scope(from).owner;
        let cont = self.ast.alloc_scope(Scope {
            owner,
            prev: Some(from),
            ..Scope::default()
        });
        self.ast.scope_mut(from).next = Some(cont);
        self.current = cont;
    }

    fn register(&mut self, ident: NodeId) {
        let scope = self.current;
        self.ast.scope_mut(scope).objects.push(ident);
        if let Some(i) = self.ast.get_mut::<Ident>(ident) {
            i.scope = Some(scope);
        }
    }

    fn define_ident(&mut self, name: &str, usage: IdentUsage) -> NodeId {
        let id = self.alloc(Ident {
            ident: name.to_string(),
            usage,
            base: None,
            scope: None,
        });
        self.register(id);
        id
    }

    fn set_base(&mut self, ident: NodeId, base: NodeId) {
        if let Some(i) = self.ast.get_mut::<Ident>(ident) {
            i.base = Some(base);
        }
    }

    // ------------------------------------------------------------------
    // Literals and expressions
    // ------------------------------------------------------------------

    pub fn int(&mut self, value: &str) -> NodeId {
        self.alloc(IntLiteral {
            value: value.to_string(),
        })
    }

    pub fn bool_lit(&mut self, value: bool) -> NodeId {
        self.alloc(BoolLiteral { value })
    }

    /// String literal from its contents as written between the quotes.
    pub fn str_lit(&mut self, contents: &str) -> NodeId {
        let value = format!("\"{contents}\"");
        let length = unescape(&value).map_or(contents.len(), |s| s.len()) as u64;
        self.alloc(StrLiteral { value, length })
    }

    pub fn char_lit(&mut self, c: char) -> NodeId {
        self.alloc(CharLiteral {
            value: format!("'{c}'"),
            code: u64::from(u32::from(c)),
        })
    }

    pub fn regex(&mut self, pattern: &str) -> NodeId {
        self.alloc(RegexLiteral {
            value: format!("/{pattern}/"),
        })
    }

    pub fn special(&mut self, kind: SpecialLiteralKind) -> NodeId {
        self.alloc(SpecialLiteral { kind })
    }

    /// Reference to a name.
    pub fn ident(&mut self, name: &str) -> NodeId {
        self.define_ident(name, IdentUsage::Unknown)
    }

    pub fn member(&mut self, target: NodeId, name: &str) -> NodeId {
        let member = self.alloc(Ident {
            ident: name.to_string(),
            usage: IdentUsage::Unknown,
            base: None,
            scope: Some(self.current),
        });
        self.alloc(MemberAccess {
            target,
            member,
            base: None,
        })
    }

    /// `input.offset`, `config.endian.big`, `Tag.A` ...
    pub fn dotted(&mut self, path: &str) -> NodeId {
        let mut parts = path.split('.');
        let head = parts.next().unwrap_or_default();
        let mut node = match head {
            "input" => self.special(SpecialLiteralKind::Input),
            "output" => self.special(SpecialLiteralKind::Output),
            "config" => self.special(SpecialLiteralKind::Config),
            name => self.ident(name),
        };
        for part in parts {
            node = self.member(node, part);
        }
        node
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, expr: NodeId) -> NodeId {
        self.alloc(Unary { op, expr })
    }

    pub fn paren(&mut self, expr: NodeId) -> NodeId {
        self.alloc(Paren { expr })
    }

    pub fn identity(&mut self, expr: NodeId) -> NodeId {
        self.alloc(Identity { expr })
    }

    pub fn cond(&mut self, cond: NodeId, then: NodeId, els: NodeId) -> NodeId {
        self.alloc(Cond { cond, then, els })
    }

    pub fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.alloc(Call { callee, arguments })
    }

    pub fn index(&mut self, expr: NodeId, index: NodeId) -> NodeId {
        self.alloc(crate::node::Index { expr, index })
    }

    pub fn range(&mut self, op: BinaryOp, start: Option<NodeId>, end: Option<NodeId>) -> NodeId {
        self.alloc(Range { op, start, end })
    }

    /// The any-value pattern `..`.
    pub fn any_range(&mut self) -> NodeId {
        self.range(BinaryOp::RangeExclusive, None, None)
    }

    pub fn type_literal(&mut self, type_literal: NodeId) -> NodeId {
        self.alloc(TypeLiteral { type_literal })
    }

    /// `config.import("path")`
    pub fn import(&mut self, path: &str) -> NodeId {
        let callee = self.dotted("config.import");
        let arg = self.str_lit(path);
        self.call(callee, vec![arg])
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub fn int_type(&mut self, bit_size: u64, is_signed: bool) -> NodeId {
        self.alloc(IntType {
            bit_size,
            is_signed,
            endian: crate::Endian::Unspec,
            is_explicit: true,
        })
    }

    pub fn uint(&mut self, bit_size: u64) -> NodeId {
        self.int_type(bit_size, false)
    }

    pub fn sint(&mut self, bit_size: u64) -> NodeId {
        self.int_type(bit_size, true)
    }

    pub fn float_type(&mut self, bit_size: u64) -> NodeId {
        self.alloc(FloatType {
            bit_size,
            endian: crate::Endian::Unspec,
            is_explicit: true,
        })
    }

    pub fn bool_type(&mut self) -> NodeId {
        self.alloc(NodeKind::BoolType)
    }

    pub fn void_type(&mut self) -> NodeId {
        self.alloc(NodeKind::VoidType)
    }

    /// Type named by an identifier, resolved later.
    pub fn ident_type(&mut self, name: &str) -> NodeId {
        let ident = self.ident(name);
        let ty = self.alloc(IdentType { ident, base: None });
        self.set_base(ident, ty);
        if let Some(i) = self.ast.get_mut::<Ident>(ident) {
            i.usage = IdentUsage::MaybeType;
        }
        ty
    }

    pub fn array_type(&mut self, element_type: NodeId, length: Option<NodeId>) -> NodeId {
        self.alloc(ArrayType {
            element_type,
            length,
            length_value: None,
            is_explicit: true,
            layout: TypeLayout::default(),
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// `name := rhs` / `name ::= rhs`, pushed as a statement.
    pub fn define(&mut self, name: &str, op: BinaryOp, rhs: NodeId) -> NodeId {
        let usage = if op == BinaryOp::ConstAssign {
            IdentUsage::DefineConst
        } else {
            IdentUsage::DefineVariable
        };
        let lhs = self.define_ident(name, usage);
        let bin = self.binary(op, lhs, rhs);
        self.set_base(lhs, bin);
        self.push(bin)
    }

    /// `target op rhs` for plain and compound assignment, pushed.
    pub fn assign(&mut self, target: NodeId, op: BinaryOp, rhs: NodeId) -> NodeId {
        let bin = self.binary(op, target, rhs);
        self.push(bin)
    }

    /// Field declaration, pushed. `arguments` are the parenthesized
    /// arguments after the type.
    pub fn field(&mut self, name: Option<&str>, field_type: NodeId, arguments: Vec<NodeId>) -> NodeId {
        let ident = name.map(|n| self.define_ident(n, IdentUsage::DefineField));
        let arguments = if arguments.is_empty() {
            None
        } else {
            Some(self.alloc(FieldArgument {
                collected_arguments: arguments,
                ..FieldArgument::default()
            }))
        };
        let field = self.alloc(Field {
            ident,
            field_type,
            arguments,
            belong: self.owners.last().copied(),
            belong_struct: None,
            is_state_variable: false,
        });
        if let Some(ident) = ident {
            self.set_base(ident, field);
        }
        self.push(field)
    }

    /// Open a block, run `body`, close it. Returns the `IndentBlock`.
    fn block(&mut self, owner: Option<NodeId>, body: impl FnOnce(&mut Self)) -> NodeId {
        let scope = self.enter_branch(owner);
        self.blocks.push(Vec::new());
        body(self);
        let elements = self.blocks.pop().unwrap_or_default();
        self.leave_branch();

        let fields: Vec<NodeId> = elements
            .iter()
            .copied()
            .filter(|&e| self.ast.node_type(e).is_member())
            .collect();
        let struct_type = self.alloc(StructType {
            fields: fields.clone(),
            base: owner,
            recursive: false,
            type_map: None,
            layout: TypeLayout::default(),
        });
        let block = self.alloc(IndentBlock {
            struct_type: Some(struct_type),
            elements,
            scope,
            metadata: Vec::new(),
            block_traits: BlockTrait::empty(),
        });
        if owner.is_none() {
            self.ast.scope_mut(scope).owner = Some(block);
            if let Some(st) = self.ast.get_mut::<StructType>(struct_type) {
                st.base = Some(block);
            }
        }
        for f in fields {
            if let Some(field) = self.ast.get_mut::<Field>(f) {
                field.belong_struct = Some(struct_type);
            }
        }
        block
    }

    /// `format Name:` with a body, pushed.
    pub fn format(&mut self, name: &str, body: impl FnOnce(&mut Self)) -> NodeId {
        let ident = self.define_ident(name, IdentUsage::DefineFormat);
        let format = self.alloc(Format {
            ident,
            belong: self.owners.last().copied(),
            body: ident,
            cast_fns: Vec::new(),
            depends: Vec::new(),
            state_variables: Vec::new(),
            encode_fn: None,
            decode_fn: None,
        });
        self.set_base(ident, format);
        self.owners.push(format);
        let block = self.block(Some(format), body);
        self.owners.pop();
        if let Some(f) = self.ast.get_mut::<Format>(format) {
            f.body = block;
        }
        self.push(format)
    }

    /// `state Name:` with a body, pushed.
    pub fn state(&mut self, name: &str, body: impl FnOnce(&mut Self)) -> NodeId {
        let ident = self.define_ident(name, IdentUsage::DefineState);
        let state = self.alloc(State {
            ident,
            belong: self.owners.last().copied(),
            body: ident,
        });
        self.set_base(ident, state);
        self.owners.push(state);
        let block = self.block(Some(state), body);
        self.owners.pop();
        if let Some(s) = self.ast.get_mut::<State>(state) {
            s.body = block;
        }
        self.push(state)
    }

    /// `enum Name:` with `members` as `(name, value)`, pushed.
    pub fn enum_def(
        &mut self,
        name: &str,
        base_type: Option<NodeId>,
        members: &[(&str, Option<NodeId>)],
    ) -> NodeId {
        let ident = self.define_ident(name, IdentUsage::DefineEnum);
        let enum_ = self.alloc(Enum {
            ident,
            belong: self.owners.last().copied(),
            scope: None,
            base_type,
            members: Vec::new(),
            enum_type: None,
        });
        self.set_base(ident, enum_);
        let scope = self.enter_branch(Some(enum_));
        let mut ids = Vec::with_capacity(members.len());
        for &(member_name, value) in members {
            let member_ident = self.define_ident(member_name, IdentUsage::DefineEnumMember);
            let member = self.alloc(EnumMember {
                ident: member_ident,
                belong: Some(enum_),
                value,
                str_literal: None,
            });
            self.set_base(member_ident, member);
            ids.push(member);
        }
        self.leave_branch();
        let enum_type = self.alloc(EnumType { base: Some(enum_) });
        if let Some(e) = self.ast.get_mut::<Enum>(enum_) {
            e.scope = Some(scope);
            e.members = ids;
            e.enum_type = Some(enum_type);
        }
        self.push(enum_)
    }

    /// `fn name(params) -> ret:` with a body, pushed. A cast function is
    /// also recorded on the enclosing format.
    pub fn function(
        &mut self,
        name: &str,
        params: &[(&str, NodeId)],
        return_type: Option<NodeId>,
        is_cast: bool,
        body: impl FnOnce(&mut Self),
    ) -> NodeId {
        let usage = if is_cast {
            IdentUsage::DefineCastFn
        } else {
            IdentUsage::DefineFn
        };
        let ident = self.define_ident(name, usage);
        let belong = self.owners.last().copied();
        let func = self.alloc(Function {
            ident,
            belong,
            parameters: Vec::new(),
            return_type,
            body: ident,
            func_type: None,
            is_cast,
        });
        self.set_base(ident, func);
        self.owners.push(func);
        let mut parameters = Vec::with_capacity(params.len());
        let block = self.block(Some(func), |b| {
            for &(param, ty) in params {
                let p_ident = b.define_ident(param, IdentUsage::DefineArg);
                let field = b.alloc(Field {
                    ident: Some(p_ident),
                    field_type: ty,
                    arguments: None,
                    belong: Some(func),
                    belong_struct: None,
                    is_state_variable: false,
                });
                b.set_base(p_ident, field);
                parameters.push(field);
            }
            body(b);
        });
        self.owners.pop();
        let param_types = params.iter().map(|&(_, ty)| ty).collect();
        let func_type = self.alloc(FunctionType {
            return_type,
            parameters: param_types,
        });
        if let Some(f) = self.ast.get_mut::<Function>(func) {
            f.parameters = parameters;
            f.body = block;
            f.func_type = Some(func_type);
        }
        if is_cast {
            if let Some(owner) = belong {
                if let Some(format) = self.ast.get_mut::<Format>(owner) {
                    format.cast_fns.push(func);
                }
            }
        }
        self.push(func)
    }

    /// `if cond: then` (not pushed).
    pub fn if_expr(&mut self, cond: NodeId, then: impl FnOnce(&mut Self)) -> NodeId {
        let cond = self.identity(cond);
        let then = self.block(None, then);
        self.alloc(If {
            cond_scope: None,
            cond,
            then,
            els: None,
        })
    }

    /// `if cond: then else: els` (not pushed).
    pub fn if_else(
        &mut self,
        cond: NodeId,
        then: impl FnOnce(&mut Self),
        els: impl FnOnce(&mut Self),
    ) -> NodeId {
        let cond = self.identity(cond);
        let then = self.block(None, then);
        let els = self.block(None, els);
        self.alloc(If {
            cond_scope: None,
            cond,
            then,
            els: Some(els),
        })
    }

    /// `match cond:` with one `cond => statement` per arm (not pushed).
    /// A `None` scrutinee makes a trial match.
    pub fn match_expr(&mut self, cond: Option<NodeId>, arms: Vec<Arm<'_>>) -> NodeId {
        let mut branches = Vec::with_capacity(arms.len());
        for arm in arms {
            let scope = self.enter_branch(None);
            // The arm's statement is owned by its branch, not the open block.
            self.blocks.push(Vec::new());
            let statement = (arm.body)(self);
            self.blocks.pop();
            self.leave_branch();
            let then = self.alloc(ScopedStatement {
                struct_type: None,
                statement,
                scope,
            });
            self.ast.scope_mut(scope).owner = Some(then);
            let branch = self.alloc(MatchBranch {
                belong: None,
                cond: arm.cond,
                then,
            });
            branches.push(branch);
        }
        let m = self.alloc(Match {
            cond_scope: None,
            cond,
            branches: branches.clone(),
            trial_match: cond.is_none(),
            struct_union_type: None,
        });
        for b in branches {
            if let Some(branch) = self.ast.get_mut::<MatchBranch>(b) {
                branch.belong = Some(m);
            }
        }
        m
    }

    /// `for name in iter: body`, pushed.
    pub fn for_in(&mut self, name: &str, iter: NodeId, body: impl FnOnce(&mut Self)) -> NodeId {
        let cond_scope = self.enter_branch(None);
        let binder = self.define_ident(name, IdentUsage::Unknown);
        let init = self.binary(BinaryOp::InAssign, binder, iter);
        self.set_base(binder, init);
        if let Some(i) = self.ast.get_mut::<Ident>(binder) {
            i.usage = IdentUsage::DefineVariable;
        }
        let body = self.block(None, body);
        self.leave_branch();
        let lp = self.alloc(Loop {
            cond_scope: Some(cond_scope),
            init: Some(init),
            cond: None,
            step: None,
            body,
        });
        self.ast.scope_mut(cond_scope).owner = Some(lp);
        self.push(lp)
    }

    /// Close the program. Returns the arena and the `Program` node.
    pub fn finish(mut self) -> (Ast, NodeId) {
        let elements = self.blocks.pop().unwrap_or_default();
        let fields: Vec<NodeId> = elements
            .iter()
            .copied()
            .filter(|&e| self.ast.node_type(e).is_member())
            .collect();
        let struct_type = self.alloc(StructType {
            fields,
            base: None,
            recursive: false,
            type_map: None,
            layout: TypeLayout::default(),
        });
        let program = self.alloc(Program {
            struct_type: Some(struct_type),
            elements,
            global_scope: self.global,
            metadata: Vec::new(),
            endian: None,
        });
        if let Some(st) = self.ast.get_mut::<StructType>(struct_type) {
            st.base = Some(program);
        }
        self.ast.scope_mut(self.global).owner = Some(program);
        (self.ast, program)
    }
}

#[cfg(test)]
mod tests;
