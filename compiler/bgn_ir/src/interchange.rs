//! JSON interchange of a whole arena.
//!
//! The document is the arena itself: a `node` table, a `scope` table and
//! the `root` index, with every edge written as a table index. Sharing and
//! cycles therefore round-trip without special cases. Decoding is two
//! phase: deserialize every entry (allocation), then check every index
//! against the tables and every slot against its declared target kind
//! (linking).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{Node, NodeType};
use crate::scope::Scope;
use crate::slots::{Expect, Slot, SlotVisitor};
use crate::{Ast, NodeId, ScopeId};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node {node}: field `{field}` points at node {target}, table has {len}")]
    NodeOutOfRange {
        node: usize,
        field: &'static str,
        target: usize,
        len: usize,
    },
    #[error("{owner}: field `{field}` points at scope {target}, table has {len}")]
    ScopeOutOfRange {
        owner: String,
        field: &'static str,
        target: usize,
        len: usize,
    },
    #[error("node {node}: field `{field}` expects {expected:?} but node {target} is {found:?}")]
    KindMismatch {
        node: usize,
        field: &'static str,
        target: usize,
        expected: Expect,
        found: NodeType,
    },
    #[error("root node {0} is not a program")]
    RootNotProgram(usize),
}

/// A decoded document.
#[derive(Debug)]
pub struct Document {
    pub ast: Ast,
    pub root: NodeId,
    pub files: Vec<String>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    files: &'a [String],
    root: NodeId,
    node: &'a [Node],
    scope: &'a [Scope],
}

#[derive(Deserialize)]
struct DocumentOwned {
    #[serde(default)]
    files: Vec<String>,
    root: NodeId,
    node: Vec<Node>,
    scope: Vec<Scope>,
}

/// Encode the arena as a JSON value.
pub fn encode_value(ast: &Ast, root: NodeId, files: &[String]) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(DocumentRef {
        files,
        root,
        node: &ast.nodes,
        scope: &ast.scopes,
    })
}

/// Encode the arena as pretty-printed JSON text.
pub fn encode(ast: &Ast, root: NodeId, files: &[String]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DocumentRef {
        files,
        root,
        node: &ast.nodes,
        scope: &ast.scopes,
    })
}

/// Decode and validate a document.
pub fn decode(text: &str) -> Result<Document, DecodeError> {
    let raw: DocumentOwned = serde_json::from_str(text)?;
    let ast = Ast {
        nodes: raw.node,
        scopes: raw.scope,
    };
    validate(&ast)?;
    if raw.root.index() >= ast.len() {
        return Err(DecodeError::NodeOutOfRange {
            node: raw.root.index(),
            field: "root",
            target: raw.root.index(),
            len: ast.len(),
        });
    }
    if ast.node_type(raw.root) != NodeType::Program {
        return Err(DecodeError::RootNotProgram(raw.root.index()));
    }
    Ok(Document {
        ast,
        root: raw.root,
        files: raw.files,
    })
}

/// Check every edge of the arena.
pub fn validate(ast: &Ast) -> Result<(), DecodeError> {
    for id in ast.ids() {
        let mut check = Check {
            ast,
            node: id.index(),
            error: None,
        };
        ast.kind(id).visit_slots(&mut check);
        if let Some(e) = check.error {
            return Err(e);
        }
        if let Some(ty) = ast.expr_type(id) {
            check_node_index(ast, id.index(), "expr_type", ty)?;
        }
    }
    for (i, scope) in ast.scopes.iter().enumerate() {
        let owner = format!("scope {i}");
        for (field, link) in [
            ("prev", scope.prev),
            ("next", scope.next),
            ("branch", scope.branch),
        ] {
            if let Some(link) = link {
                check_scope_index(ast, &owner, field, link)?;
            }
        }
        for &obj in scope.objects.iter().chain(scope.owner.iter()) {
            check_node_index(ast, i, "objects", obj)?;
        }
    }
    Ok(())
}

fn check_node_index(ast: &Ast, node: usize, field: &'static str, target: NodeId) -> Result<(), DecodeError> {
    if target.index() < ast.len() {
        Ok(())
    } else {
        Err(DecodeError::NodeOutOfRange {
            node,
            field,
            target: target.index(),
            len: ast.len(),
        })
    }
}

fn check_scope_index(ast: &Ast, owner: &str, field: &'static str, target: ScopeId) -> Result<(), DecodeError> {
    if target.index() < ast.scope_count() {
        Ok(())
    } else {
        Err(DecodeError::ScopeOutOfRange {
            owner: owner.to_string(),
            field,
            target: target.index(),
            len: ast.scope_count(),
        })
    }
}

struct Check<'a> {
    ast: &'a Ast,
    node: usize,
    error: Option<DecodeError>,
}

impl SlotVisitor for Check<'_> {
    fn node(&mut self, slot: Slot, id: &NodeId) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = check_node_index(self.ast, self.node, slot.name, *id) {
            self.error = Some(e);
            return;
        }
        let found = self.ast.node_type(*id);
        if !slot.expect.accepts(found) {
            self.error = Some(DecodeError::KindMismatch {
                node: self.node,
                field: slot.name,
                target: id.index(),
                expected: slot.expect,
                found,
            });
        }
    }

    fn scope(&mut self, name: &'static str, id: &ScopeId) {
        if self.error.is_none() {
            if let Err(e) = check_scope_index(self.ast, &format!("node {}", self.node), name, *id) {
                self.error = Some(e);
            }
        }
    }
}
