//! Lexical scope graph.
//!
//! A scope is a chain of *segments*. Entering a nested block (format body,
//! `if` arm, match branch, loop body) hangs a new segment off the current
//! one through `branch`, with `prev` pointing back out. Leaving the block
//! starts a fresh continuation segment linked through `next`/`prev` to the
//! segment the block was entered from, so names declared inside the block
//! are not on the continuation's `prev` chain and stay invisible after it.
//!
//! ```text
//!   S0 --next--> S1 --next--> S2          (top level)
//!   |            |
//! branch       branch
//!   v            v
//!   T0 (then)    E0 (else)                prev of T0/E0 -> S0/S1
//! ```

use crate::{Ast, NodeId, ScopeId};

/// One segment of the scope chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Scope {
    /// Identifiers that occurred in this segment, in source order. Weak.
    pub objects: Vec<NodeId>,
    /// Node that opened the block this segment belongs to. Weak.
    pub owner: Option<NodeId>,
    pub prev: Option<ScopeId>,
    pub next: Option<ScopeId>,
    pub branch: Option<ScopeId>,
    /// First segment of a nested block.
    #[cfg_attr(feature = "interchange", serde(default))]
    pub branch_root: bool,
}

impl Ast {
    /// Search outward from `scope` for an identifier accepted by `pred`.
    ///
    /// In the starting segment only identifiers that occurred before `from`
    /// are considered (all of them if `from` is not in that segment); outer
    /// segments are searched completely, latest occurrence first.
    pub fn lookup_local(
        &self,
        scope: ScopeId,
        from: Option<NodeId>,
        mut pred: impl FnMut(&Ast, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(scope);
        let mut limit = from;
        let mut budget = self.scope_count() + 1;
        while let Some(id) = current {
            if budget == 0 {
                break;
            }
            budget -= 1;
            let seg = self.scope(id);
            let end = limit
                .and_then(|f| seg.objects.iter().rposition(|&o| o == f))
                .unwrap_or(seg.objects.len());
            if let Some(found) = seg.objects[..end]
                .iter()
                .rev()
                .copied()
                .find(|&o| pred(self, o))
            {
                return Some(found);
            }
            limit = None;
            current = seg.prev;
        }
        None
    }

    /// Search the top-level segments of a program, first occurrence first.
    ///
    /// Nested blocks are not entered, so only file-scope declarations match.
    pub fn lookup_global(
        &self,
        global: ScopeId,
        mut pred: impl FnMut(&Ast, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(global);
        let mut budget = self.scope_count() + 1;
        while let Some(id) = current {
            if budget == 0 {
                break;
            }
            budget -= 1;
            let seg = self.scope(id);
            if let Some(found) = seg.objects.iter().copied().find(|&o| pred(self, o)) {
                return Some(found);
            }
            current = seg.next;
        }
        None
    }
}
