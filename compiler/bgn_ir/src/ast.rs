//! The node/scope arena.
//!
//! # Design
//! One [`Ast`] owns every node and scope of a compilation unit (imports are
//! loaded into the same arena). Nodes are never freed individually: a node
//! replaced in its parent's slot stays in the arena, still reachable through
//! weak `base` links that point back at the pre-desugared form. Dropping the
//! arena drops everything at once, so teardown needs no recursion.

use smallvec::SmallVec;

use crate::node::{Downcast, Node, NodeKind, NodeType};
use crate::scope::Scope;
use crate::slots::{Slot, SlotVisitor, SlotVisitorMut};
use crate::{Loc, NodeId, ScopeId};

/// Owned children of a node, in slot order.
pub type Children = SmallVec<[NodeId; 4]>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ast {
    pub(crate) nodes: Vec<Node>,
    pub(crate) scopes: Vec<Scope>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    /// Allocate a node.
    pub fn alloc(&mut self, loc: Loc, kind: impl Into<NodeKind>) -> NodeId {
        self.push(Node::new(loc, kind.into()))
    }

    /// Allocate a prepared node, keeping its typing results.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    pub fn alloc_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId::new(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(scope);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.nodes[id.index()].node_type()
    }

    #[inline]
    pub fn loc(&self, id: NodeId) -> Loc {
        self.nodes[id.index()].loc
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Typed view of a node, `None` if it is another kind.
    #[inline]
    pub fn get<T: Downcast>(&self, id: NodeId) -> Option<&T> {
        T::downcast(&self.nodes[id.index()].kind)
    }

    #[inline]
    pub fn get_mut<T: Downcast>(&mut self, id: NodeId) -> Option<&mut T> {
        T::downcast_mut(&mut self.nodes[id.index()].kind)
    }

    #[inline]
    pub fn is<T: Downcast>(&self, id: NodeId) -> bool {
        self.node_type(id) == T::NODE_TYPE
    }

    #[inline]
    pub fn expr_type(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].expr_type
    }

    /// Iterate all node handles in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId::new(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Owned children of `id`, in slot order.
    pub fn children(&self, id: NodeId) -> Children {
        struct Collect(Children);
        impl SlotVisitor for Collect {
            fn node(&mut self, slot: Slot, id: &NodeId) {
                if slot.is_owned() {
                    self.0.push(*id);
                }
            }
        }
        let mut collect = Collect(SmallVec::new());
        self.kind(id).visit_slots(&mut collect);
        collect.0
    }

    /// Every node owned (transitively) by `root`, root first, in pre-order.
    ///
    /// Uses an explicit work list, so nesting depth is unbounded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Replace every owned slot of `parent` holding `old` with `new`.
    ///
    /// Returns whether a slot was rewritten.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        struct Replace {
            old: NodeId,
            new: NodeId,
            hit: bool,
        }
        impl SlotVisitorMut for Replace {
            fn node(&mut self, slot: Slot, id: &mut NodeId) {
                if slot.is_owned() && *id == self.old {
                    *id = self.new;
                    self.hit = true;
                }
            }
        }
        let mut replace = Replace {
            old,
            new,
            hit: false,
        };
        self.node_mut(parent).kind.visit_slots_mut(&mut replace);
        replace.hit
    }

    /// Copy the subtree owned by `root`. Weak edges and scopes are shared
    /// with the original; typing results are kept.
    pub fn deep_copy(&mut self, root: NodeId) -> NodeId {
        bgn_stack::ensure_sufficient_stack(|| {
            let mut node = self.node(root).clone();
            let mut children = Vec::new();
            node.kind.visit_slots(&mut OwnedChildren(&mut children));
            let copies: Vec<NodeId> = children.into_iter().map(|c| self.deep_copy(c)).collect();
            let mut next = copies.into_iter();
            node.kind.visit_slots_mut(&mut Reassign(&mut next));
            self.push(node)
        })
    }

    /// Move every node and scope of `other` to the end of this arena,
    /// shifting its handles and re-tagging its locations with `file`.
    pub fn append(&mut self, other: Ast, file: u32) -> Shift {
        let shift = Shift {
            nodes: u32::try_from(self.nodes.len()).unwrap_or(u32::MAX),
            scopes: u32::try_from(self.scopes.len()).unwrap_or(u32::MAX),
        };
        let mut shifter = Shifter(shift);
        for mut node in other.nodes {
            node.kind.visit_slots_mut(&mut shifter);
            node.expr_type = node.expr_type.map(|t| shift.node(t));
            node.loc.file = file;
            self.nodes.push(node);
        }
        for mut scope in other.scopes {
            for o in &mut scope.objects {
                *o = shift.node(*o);
            }
            scope.owner = scope.owner.map(|o| shift.node(o));
            scope.prev = scope.prev.map(|s| shift.scope(s));
            scope.next = scope.next.map(|s| shift.scope(s));
            scope.branch = scope.branch.map(|s| shift.scope(s));
            self.scopes.push(scope);
        }
        shift
    }

    // ------------------------------------------------------------------
    // Small shared queries
    // ------------------------------------------------------------------

    /// Name of an `Ident`, if the node is one.
    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        self.get::<crate::Ident>(id).map(|i| i.ident.as_str())
    }

    /// Strip `Paren`/`Identity` wrappers.
    pub fn unwrap_paren(&self, mut id: NodeId) -> NodeId {
        loop {
            match self.kind(id) {
                NodeKind::Paren(p) => id = p.expr,
                NodeKind::Identity(i) => id = i.expr,
                _ => return id,
            }
        }
    }

    /// Follow a reference `Ident` chain to its defining `Ident`.
    pub fn definition_ident(&self, mut id: NodeId) -> NodeId {
        let mut steps = 0usize;
        while let Some(ident) = self.get::<crate::Ident>(id) {
            match ident.base {
                Some(base) if self.is::<crate::Ident>(base) && steps < self.nodes.len() => {
                    id = base;
                    steps += 1;
                }
                _ => break,
            }
        }
        id
    }
}

/// Handle offsets of an arena merged by [`Ast::append`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Shift {
    nodes: u32,
    scopes: u32,
}

impl Shift {
    /// Where a node of the merged arena now lives.
    pub fn node(self, id: NodeId) -> NodeId {
        NodeId::new(id.raw() + self.nodes)
    }

    pub fn scope(self, id: ScopeId) -> ScopeId {
        ScopeId::new(id.raw() + self.scopes)
    }
}

struct Shifter(Shift);

impl SlotVisitorMut for Shifter {
    fn node(&mut self, _slot: Slot, id: &mut NodeId) {
        *id = self.0.node(*id);
    }

    fn scope(&mut self, _name: &'static str, id: &mut ScopeId) {
        *id = self.0.scope(*id);
    }
}

struct OwnedChildren<'a>(&'a mut Vec<NodeId>);

impl SlotVisitor for OwnedChildren<'_> {
    fn node(&mut self, slot: Slot, id: &NodeId) {
        if slot.is_owned() {
            self.0.push(*id);
        }
    }
}

struct Reassign<'a, I: Iterator<Item = NodeId>>(&'a mut I);

impl<I: Iterator<Item = NodeId>> SlotVisitorMut for Reassign<'_, I> {
    fn node(&mut self, slot: Slot, id: &mut NodeId) {
        if slot.is_owned() {
            if let Some(copy) = self.0.next() {
                *id = copy;
            }
        }
    }
}

#[cfg(test)]
mod tests;
