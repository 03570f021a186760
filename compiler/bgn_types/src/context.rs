//! The typing pass state.
//!
//! # Design
//! [`Typing`] borrows the arena mutably for the whole pass and carries the
//! state the recursive functions share: the global scope of the program
//! being typed, the warning sink, and the in-progress set that turns a
//! circular constant definition into an error instead of unbounded
//! recursion. Every typing function returns [`TypeResult`]; the first fatal
//! error unwinds through `?` to [`Typing::type_program`].

use bgn_diagnostic::{Diagnostic, ErrorCode, LocationError, Warnings};
use bgn_eval::Solution;
use bgn_ir::{
    type_to_string, Ast, ConstantLevel, Ident, IdentUsage, MemberAccess, NodeId, NodeKind,
    ScopeId,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Interval, TypeResult};

/// Options of a typing run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TypingConfig {
    /// Fail when an expression is left without a type.
    pub unresolved_type_as_error: bool,
}

/// Typing pass over one arena.
pub struct Typing<'a> {
    pub(crate) ast: &'a mut Ast,
    pub(crate) warnings: Warnings,
    pub(crate) config: TypingConfig,
    /// Global scope of the innermost program being typed.
    pub(crate) current_global: Option<ScopeId>,
    /// Innermost format whose body is being typed.
    pub(crate) current_format: Option<NodeId>,
    /// Innermost function whose body is being typed.
    pub(crate) current_function: Option<NodeId>,
    /// Definitions currently being typed.
    pub(crate) resolving: FxHashSet<NodeId>,
    /// Programs already typed; imports may share one.
    pub(crate) typed_programs: FxHashSet<NodeId>,
    pub(crate) coverage_gaps: FxHashMap<NodeId, Vec<Interval>>,
    pub(crate) length_solutions: FxHashMap<NodeId, Solution>,
    pub(crate) next_tmp: u64,
}

impl<'a> Typing<'a> {
    pub fn new(ast: &'a mut Ast) -> Self {
        Self::with_config(ast, TypingConfig::default())
    }

    pub fn with_config(ast: &'a mut Ast, config: TypingConfig) -> Self {
        Typing {
            ast,
            warnings: Warnings::new(),
            config,
            current_global: None,
            current_format: None,
            current_function: None,
            resolving: FxHashSet::default(),
            typed_programs: FxHashSet::default(),
            coverage_gaps: FxHashMap::default(),
            length_solutions: FxHashMap::default(),
            next_tmp: 0,
        }
    }

    /// Type the program rooted at `root`.
    ///
    /// Nodes typed before a fatal error keep their results; the arena is
    /// otherwise left as it was when the error was raised.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn type_program(&mut self, root: NodeId) -> TypeResult<()> {
        self.type_node(root)?;
        if self.config.unresolved_type_as_error {
            self.check_all_typed(root)?;
        }
        tracing::debug!(
            warnings = self.warnings.len(),
            gaps = self.coverage_gaps.len(),
            "typing finished"
        );
        Ok(())
    }

    pub fn ast(&self) -> &Ast {
        self.ast
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// Sorted and deduplicated warnings.
    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.warnings.finish()
    }

    /// Uncovered intervals of a non-exhaustive integer `match`.
    pub fn coverage_gaps(&self, match_id: NodeId) -> Option<&[Interval]> {
        self.coverage_gaps.get(&match_id).map(Vec::as_slice)
    }

    /// Expression computing a field's array length from the value of the
    /// single field its length expression mentions.
    pub fn length_solution(&self, field: NodeId) -> Option<&Solution> {
        self.length_solutions.get(&field)
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn set_type(&mut self, id: NodeId, ty: NodeId, level: ConstantLevel) {
        let node = self.ast.node_mut(id);
        node.expr_type = Some(ty);
        node.constant_level = level;
    }

    pub(crate) fn level(&self, id: NodeId) -> ConstantLevel {
        self.ast.node(id).constant_level
    }

    pub(crate) fn alloc_at(&mut self, at: NodeId, kind: impl Into<NodeKind>) -> NodeId {
        let loc = self.ast.loc(at);
        self.ast.alloc(loc, kind)
    }

    pub(crate) fn type_name(&self, ty: NodeId) -> String {
        type_to_string(self.ast, ty)
    }

    #[cold]
    pub(crate) fn error(&self, code: ErrorCode, at: NodeId, message: impl Into<String>) -> LocationError {
        LocationError::new(code, self.ast.loc(at), message)
    }

    pub(crate) fn warn(&mut self, code: ErrorCode, at: NodeId, message: impl Into<String>) {
        let loc = self.ast.loc(at);
        self.warnings.warn(code, loc, message);
    }

    /// Report that `at` cannot be typed because `operand` has no type yet.
    pub(crate) fn skip_untyped(&mut self, at: NodeId, operand: NodeId) {
        let what = format!("{:?}", self.ast.node_type(operand));
        self.warn(
            ErrorCode::W0001,
            at,
            format!("{what} has no type yet; skipping"),
        );
    }

    pub(crate) fn fresh_tmp(&mut self) -> u64 {
        let tmp = self.next_tmp;
        self.next_tmp += 1;
        tmp
    }

    // ------------------------------------------------------------------
    // Unresolved check
    // ------------------------------------------------------------------

    fn check_all_typed(&self, root: NodeId) -> TypeResult<()> {
        let nodes = self.ast.descendants(root);
        let members: FxHashSet<NodeId> = nodes
            .iter()
            .filter_map(|&id| self.ast.get::<MemberAccess>(id).map(|m| m.member))
            .collect();
        for id in nodes {
            if self.ast.expr_type(id).is_some() || !self.requires_type(id, &members) {
                continue;
            }
            return Err(self.error(
                ErrorCode::E1007,
                id,
                format!("type of {:?} is not resolved", self.ast.node_type(id)),
            ));
        }
        Ok(())
    }

    fn requires_type(&self, id: NodeId, members: &FxHashSet<NodeId>) -> bool {
        match self.ast.kind(id) {
            NodeKind::Ident(Ident { usage, .. }) => {
                !members.contains(&id)
                    && matches!(
                        usage,
                        IdentUsage::Unknown
                            | IdentUsage::Reference
                            | IdentUsage::DefineVariable
                            | IdentUsage::DefineConst
                    )
            }
            NodeKind::SpecialLiteral(_) | NodeKind::TmpVar(_) => false,
            NodeKind::MemberAccess(_) => bgn_ir::config_name(self.ast, id).is_none(),
            kind => kind.node_type().is_expr(),
        }
    }
}
