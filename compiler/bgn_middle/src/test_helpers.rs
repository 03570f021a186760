//! Fixtures shared by the pass tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bgn_ir::{Ast, AstBuilder, Binary, Ident, IdentUsage, NodeId, Program};
use rustc_hash::FxHashMap;

use crate::{ImportError, ImportLoader};

type Source = Box<dyn Fn(&mut AstBuilder)>;

/// Programs served from memory, keyed by path.
#[derive(Default)]
pub(crate) struct MemoryLoader {
    sources: FxHashMap<String, Source>,
    broken: Vec<String>,
    /// Every `load` call, in order.
    pub loads: Vec<String>,
}

impl MemoryLoader {
    pub fn with(mut self, path: &str, build: impl Fn(&mut AstBuilder) + 'static) -> Self {
        self.sources.insert(path.to_string(), Box::new(build));
        self
    }

    /// A path that opens but fails to parse.
    pub fn broken(mut self, path: &str) -> Self {
        self.sources.insert(path.to_string(), Box::new(|_: &mut AstBuilder| {}));
        self.broken.push(path.to_string());
        self
    }
}

impl ImportLoader for MemoryLoader {
    fn canonicalize(&mut self, path: &str, _from: Option<&str>) -> Result<String, ImportError> {
        if self.sources.contains_key(path) {
            Ok(path.to_string())
        } else {
            Err(ImportError::Open {
                path: path.to_string(),
                reason: "not found".to_string(),
            })
        }
    }

    fn load(&mut self, canonical: &str) -> Result<(Ast, NodeId), ImportError> {
        self.loads.push(canonical.to_string());
        if self.broken.iter().any(|b| b == canonical) {
            return Err(ImportError::Parse {
                path: canonical.to_string(),
                reason: "unexpected token".to_string(),
            });
        }
        let mut b = AstBuilder::new();
        (self.sources[canonical])(&mut b);
        Ok(b.finish())
    }
}

pub(crate) fn elements(ast: &Ast, root: NodeId) -> Vec<NodeId> {
    ast.get::<Program>(root).expect("program").elements.clone()
}

/// Right operand of a binary statement, e.g. the value of `x := v`.
pub(crate) fn right(ast: &Ast, binary: NodeId) -> NodeId {
    ast.get::<Binary>(binary).expect("binary").right
}

pub(crate) fn usage(ast: &Ast, ident: NodeId) -> IdentUsage {
    ast.get::<Ident>(ident).expect("ident").usage
}
