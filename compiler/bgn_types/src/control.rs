//! `if` and `match`: condition checks, implicit yields, the struct union a
//! field-declaring match describes, and integer exhaustiveness.

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_eval::Evaluator;
use bgn_ir::{
    Ast, BinaryOp, ConstantLevel, Field, If, ImplicitYield, IndentBlock, Match, MatchBranch, NodeId,
    NodeKind, NodeType, OrCond, Range, RangeType, ScopedStatement, StructType, StructUnionType,
    TypeLayout,
};

use crate::exhaustive::{Coverage, Interval};
use crate::relations::{comparable_type, enum_base, equal_type, int_shape, resolve_alias};
use crate::{Typing, TypeResult};

/// `..` matches anything.
fn is_wildcard(ast: &Ast, pattern: NodeId) -> bool {
    ast.get::<Range>(ast.unwrap_paren(pattern))
        .is_some_and(|r| r.start.is_none() && r.end.is_none())
}

/// Reinterpret an evaluated value in the scrutinee's signedness.
fn to_point(value: u64, is_signed: bool) -> i128 {
    if is_signed {
        i128::from(i64::from_ne_bytes(value.to_ne_bytes()))
    } else {
        i128::from(value)
    }
}

impl Typing<'_> {
    // ------------------------------------------------------------------
    // if
    // ------------------------------------------------------------------

    pub(crate) fn type_if(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(&If { cond, then, els, .. }) = self.ast.get::<If>(id) else {
            return Ok(());
        };
        let cond = self.type_slot(id, cond)?;
        self.require_bool(cond, "if condition")?;
        let then = self.type_slot(id, then)?;
        let els = match els {
            Some(e) => Some(self.type_slot(id, e)?),
            None => None,
        };
        let tails = match els {
            Some(e) => vec![self.block_tail(then), self.else_tail(e)],
            None => Vec::new(),
        };
        self.yield_tails(id, &tails)
    }

    /// Last statement of a block.
    fn block_tail(&self, block: NodeId) -> Option<(NodeId, NodeId)> {
        match self.ast.kind(block) {
            NodeKind::IndentBlock(IndentBlock { elements, .. }) => {
                elements.last().map(|&t| (block, t))
            }
            NodeKind::ScopedStatement(ScopedStatement { statement, .. }) => {
                Some((block, *statement))
            }
            _ => None,
        }
    }

    /// Value of an `else` arm: its block's tail, or a chained `if` itself.
    fn else_tail(&self, els: NodeId) -> Option<(NodeId, NodeId)> {
        if self.ast.node_type(els) == NodeType::If {
            return Some((els, els));
        }
        self.block_tail(els)
    }

    /// When every arm ends in an expression of one type (literals fitted to
    /// the first arm's type), the construct yields that type and each arm's tail is wrapped in `ImplicitYield`.
    /// Otherwise it is a statement of type void.
    fn yield_tails(&mut self, id: NodeId, tails: &[Option<(NodeId, NodeId)>]) -> TypeResult<()> {
        let common = self.common_tail_type(tails)?;
        let Some(ty) = common else {
            let void = self.alloc_at(id, NodeKind::VoidType);
            self.set_type(id, void, ConstantLevel::Variable);
            return Ok(());
        };
        for &(parent, tail) in tails.iter().flatten() {
            if parent == tail {
                continue;
            }
            let wrapped = self.alloc_at(tail, ImplicitYield { expr: tail });
            if let Some(t) = self.ast.expr_type(tail) {
                let level = self.level(tail);
                self.set_type(wrapped, t, level);
            }
            self.ast.replace_child(parent, tail, wrapped);
        }
        self.set_type(id, ty, ConstantLevel::Variable);
        Ok(())
    }

    fn common_tail_type(&mut self, tails: &[Option<(NodeId, NodeId)>]) -> TypeResult<Option<NodeId>> {
        if tails.is_empty() {
            return Ok(None);
        }
        let mut exprs = Vec::with_capacity(tails.len());
        for tail in tails {
            let Some((_, t)) = *tail else {
                return Ok(None);
            };
            let typed = self
                .ast
                .expr_type(t)
                .filter(|&ty| self.ast.node_type(ty) != NodeType::VoidType);
            if !self.ast.node_type(t).is_expr() || typed.is_none() {
                return Ok(None);
            }
            exprs.push(t);
        }
        let mut common = self.materialize(exprs[0]);
        for &e in &exprs[1..] {
            let Some(acc) = common else {
                return Ok(None);
            };
            self.fit_to(e, acc)?;
            let ty = self.ast.expr_type(e);
            common = ty.filter(|&ty| equal_type(self.ast, acc, ty)).map(|_| acc);
        }
        Ok(common)
    }

    // ------------------------------------------------------------------
    // match
    // ------------------------------------------------------------------

    pub(crate) fn type_match(&mut self, id: NodeId) -> TypeResult<()> {
        let Some(m) = self.ast.get::<Match>(id) else {
            return Ok(());
        };
        let (scrutinee, branches) = (m.cond, m.branches.clone());
        let scrutinee = match scrutinee {
            Some(c) => Some(self.type_slot(id, c)?),
            None => None,
        };
        let target_ty = scrutinee.and_then(|c| self.ast.expr_type(c));
        // Without a target, a `..` may be followed by further `..` branches
        // that are tried in order.
        let mut any_match = None;
        let mut trial_match = false;
        for &branch in &branches {
            let Some(&MatchBranch { cond, then, .. }) = self.ast.get::<MatchBranch>(branch) else {
                continue;
            };
            if let (Some(first), false) = (any_match, trial_match) {
                if scrutinee.is_some() {
                    return Err(self.misplaced_wildcard(cond, first));
                }
                trial_match = true;
            }
            let wildcard = is_wildcard(self.ast, cond);
            let cond = self.type_slot(branch, cond)?;
            if !wildcard {
                self.check_pattern(scrutinee.is_some(), target_ty, cond)?;
            }
            self.type_slot(branch, then)?;
            if wildcard {
                any_match = Some(cond);
            } else if let (Some(first), true) = (any_match, trial_match) {
                return Err(self.misplaced_wildcard(cond, first));
            }
        }
        if let Some(m) = self.ast.get_mut::<Match>(id) {
            m.trial_match = trial_match;
        }
        let tails: Vec<Option<(NodeId, NodeId)>> = branches
            .iter()
            .map(|&b| {
                self.ast
                    .get::<MatchBranch>(b)
                    .and_then(|mb| self.block_tail(mb.then))
            })
            .collect();
        self.yield_tails(id, &tails)?;
        let exhaustive = match any_match {
            Some(_) => true,
            None => self.check_coverage(id, target_ty, &branches)?,
        };
        self.build_struct_union(id, &branches, exhaustive);
        Ok(())
    }

    fn misplaced_wildcard(&self, cond: NodeId, first: NodeId) -> LocationError {
        let err = self.error(
            ErrorCode::E3003,
            cond,
            "any match (`..`) must be unique and be the last match branch",
        );
        let loc = self.ast.loc(first);
        err.with_secondary_label(loc, "any match (`..`) is already defined here")
    }

    fn check_pattern(&mut self, has_target: bool, target_ty: Option<NodeId>, pattern: NodeId) -> TypeResult<()> {
        let Some(pattern_ty) = self.ast.expr_type(pattern) else {
            self.skip_untyped(pattern, pattern);
            return Ok(());
        };
        if !has_target {
            if self.ast.node_type(pattern_ty) != NodeType::BoolType {
                return Err(self.error(
                    ErrorCode::E3002,
                    pattern,
                    format!(
                        "condition of a match without a target must be bool but got {}",
                        self.type_name(pattern_ty)
                    ),
                ));
            }
            return Ok(());
        }
        let Some(target_ty) = target_ty else {
            return Ok(());
        };
        self.fit_pattern(pattern, target_ty)?;
        let pattern_ty = self.ast.expr_type(pattern).unwrap_or(pattern_ty);
        if !comparable_type(self.ast, target_ty, pattern_ty) {
            return Err(self.error(
                ErrorCode::E3001,
                pattern,
                format!(
                    "cannot compare {} with pattern of type {}",
                    self.type_name(target_ty),
                    self.type_name(pattern_ty)
                ),
            ));
        }
        Ok(())
    }

    /// Give literal patterns, range endpoints and alternatives the
    /// scrutinee's type.
    fn fit_pattern(&mut self, pattern: NodeId, target: NodeId) -> TypeResult<()> {
        match self.ast.kind(pattern) {
            NodeKind::Range(r) => {
                let (start, end) = (r.start, r.end);
                for endpoint in start.into_iter().chain(end) {
                    self.fit_to(endpoint, target)?;
                }
                let range_ty = self.ast.expr_type(pattern);
                if let Some(rt) = range_ty.and_then(|t| self.ast.get_mut::<RangeType>(t)) {
                    rt.base_type = Some(target);
                }
                Ok(())
            }
            NodeKind::OrCond(OrCond { cond, .. }) => {
                for c in cond.clone() {
                    self.fit_pattern(c, target)?;
                }
                if self.ast.expr_type(pattern).is_some() {
                    let level = self.level(pattern);
                    self.set_type(pattern, target, level);
                }
                Ok(())
            }
            _ => self.fit_to(pattern, target),
        }
    }

    // ------------------------------------------------------------------
    // Exhaustiveness
    // ------------------------------------------------------------------

    /// The integer shape a scrutinee's patterns are checked against.
    fn int_domain(&self, ty: NodeId) -> Option<(u64, bool)> {
        let resolved = resolve_alias(self.ast, ty);
        match self.ast.kind(resolved) {
            NodeKind::EnumType(e) => int_shape(self.ast, enum_base(self.ast, e.base)?),
            _ => int_shape(self.ast, resolved),
        }
    }

    /// Subtract every constant pattern from the scrutinee's domain. A
    /// pattern that is not constant ends the check without a verdict.
    fn check_coverage(&mut self, id: NodeId, target_ty: Option<NodeId>, branches: &[NodeId]) -> TypeResult<bool> {
        let Some((bits, is_signed)) = target_ty.and_then(|t| self.int_domain(t)) else {
            return Ok(false);
        };
        if bits > 64 {
            return Ok(false);
        }
        let domain = Coverage::domain(bits, is_signed);
        let mut coverage = Coverage::new(domain);
        let evaluator = Evaluator::resolve_ident();
        for &branch in branches {
            let Some(pattern) = self.ast.get::<MatchBranch>(branch).map(|b| b.cond) else {
                continue;
            };
            if coverage.is_empty() {
                self.warn(ErrorCode::W0002, branch, "maybe unreachable code");
                continue;
            }
            let Some(intervals) = self.pattern_intervals(&evaluator, pattern, domain, is_signed)? else {
                tracing::trace!(?id, "pattern is not constant; skipping coverage");
                return Ok(false);
            };
            for interval in intervals {
                coverage.subtract(interval);
            }
        }
        if coverage.is_empty() {
            return Ok(true);
        }
        tracing::debug!(?id, gaps = ?coverage.gaps(), "match is not exhaustive");
        self.coverage_gaps.insert(id, coverage.into_gaps());
        Ok(false)
    }

    fn pattern_intervals(
        &self,
        evaluator: &Evaluator,
        pattern: NodeId,
        domain: Interval,
        is_signed: bool,
    ) -> TypeResult<Option<Vec<Interval>>> {
        let pattern = self.ast.unwrap_paren(pattern);
        let point = |id: NodeId| {
            evaluator
                .eval_int(self.ast, id)
                .ok()
                .map(|v| to_point(v, is_signed))
        };
        match self.ast.kind(pattern) {
            NodeKind::Range(r) => {
                let start = match r.start {
                    Some(s) => match point(s) {
                        Some(v) => v,
                        None => return Ok(None),
                    },
                    None => domain.start,
                };
                let end = match r.end {
                    Some(e) => match point(e) {
                        Some(v) if r.op == BinaryOp::RangeExclusive => v - 1,
                        Some(v) => v,
                        None => return Ok(None),
                    },
                    None => domain.end,
                };
                if start > end {
                    return Err(self.error(
                        ErrorCode::E3004,
                        pattern,
                        format!("range start {start} is greater than end {end}"),
                    ));
                }
                Ok(Some(vec![Interval::new(start, end)]))
            }
            NodeKind::OrCond(o) => {
                let mut all = Vec::with_capacity(o.cond.len());
                for &c in &o.cond {
                    match self.pattern_intervals(evaluator, c, domain, is_signed)? {
                        Some(intervals) => all.extend(intervals),
                        None => return Ok(None),
                    }
                }
                Ok(Some(all))
            }
            _ => Ok(point(pattern).map(|v| vec![Interval::point(v)])),
        }
    }

    // ------------------------------------------------------------------
    // Struct unions
    // ------------------------------------------------------------------

    /// A match whose branches declare fields describes a tagged layout:
    /// one struct per branch, selected by the branch conditions.
    fn build_struct_union(&mut self, id: NodeId, branches: &[NodeId], exhaustive: bool) {
        if let Some(existing) = self.ast.get::<Match>(id).and_then(|m| m.struct_union_type) {
            if let Some(su) = self.ast.get_mut::<StructUnionType>(existing) {
                su.exhaustive = exhaustive;
            }
            return;
        }
        let mut structs = Vec::with_capacity(branches.len());
        let mut conds = Vec::with_capacity(branches.len());
        let mut union_fields = Vec::new();
        for &branch in branches {
            let Some(&MatchBranch { cond, then, .. }) = self.ast.get::<MatchBranch>(branch) else {
                continue;
            };
            let fields = self.branch_fields(then);
            union_fields.extend(fields.iter().copied());
            let st = self.alloc_at(
                branch,
                StructType {
                    fields,
                    base: Some(branch),
                    recursive: false,
                    type_map: None,
                    layout: TypeLayout::default(),
                },
            );
            structs.push(st);
            conds.push(cond);
        }
        if union_fields.is_empty() {
            return;
        }
        let cond = self.ast.get::<Match>(id).and_then(|m| m.cond);
        let su = self.alloc_at(
            id,
            StructUnionType {
                cond,
                conds,
                structs,
                base: Some(id),
                union_fields,
                exhaustive,
                layout: TypeLayout::default(),
            },
        );
        if let Some(m) = self.ast.get_mut::<Match>(id) {
            m.struct_union_type = Some(su);
        }
    }

    fn branch_fields(&self, then: NodeId) -> Vec<NodeId> {
        let candidates = match self.ast.kind(then) {
            NodeKind::ScopedStatement(s) => match self.ast.kind(s.statement) {
                NodeKind::IndentBlock(b) => b.elements.clone(),
                _ => vec![s.statement],
            },
            NodeKind::IndentBlock(b) => b.elements.clone(),
            _ => Vec::new(),
        };
        candidates
            .into_iter()
            .filter(|&f| self.ast.is::<Field>(f))
            .collect()
    }
}
