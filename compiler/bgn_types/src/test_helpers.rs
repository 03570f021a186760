//! Fixtures shared by the typing unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_eval::Solution;
use bgn_ir::{type_to_string, Ast, AstBuilder, Binary, ConstantLevel, NodeId};
use rustc_hash::FxHashMap;

use crate::{Interval, Typing, TypingConfig};

/// Outcome of typing one built program.
pub(crate) struct Typed {
    pub ast: Ast,
    pub root: NodeId,
    pub result: Result<(), LocationError>,
    pub warnings: bgn_diagnostic::Warnings,
    pub gaps: FxHashMap<NodeId, Vec<Interval>>,
    pub solutions: FxHashMap<NodeId, Solution>,
}

impl Typed {
    /// Panic with the error if typing failed.
    pub fn ok(self) -> Self {
        if let Err(e) = &self.result {
            panic!("typing failed: {:?} {}", e.code(), e.message());
        }
        self
    }

    pub fn err(&self) -> &LocationError {
        match &self.result {
            Ok(()) => panic!("expected a typing error"),
            Err(e) => e,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.err().code()
    }

    /// Rendered type of `id`, `<untyped>` if it has none.
    pub fn ty(&self, id: NodeId) -> String {
        self.ast
            .expr_type(id)
            .map_or_else(|| "<untyped>".to_string(), |t| type_to_string(&self.ast, t))
    }

    pub fn level(&self, id: NodeId) -> ConstantLevel {
        self.ast.node(id).constant_level
    }

    /// Current right operand of a binary (after desugaring).
    pub fn right(&self, binary: NodeId) -> NodeId {
        self.ast.get::<Binary>(binary).expect("binary").right
    }

    pub fn left(&self, binary: NodeId) -> NodeId {
        self.ast.get::<Binary>(binary).expect("binary").left
    }
}

/// Build a program, then type it.
pub(crate) fn typed<T>(build: impl FnOnce(&mut AstBuilder) -> T) -> (Typed, T) {
    typed_with(TypingConfig::default(), build)
}

pub(crate) fn typed_with<T>(
    config: TypingConfig,
    build: impl FnOnce(&mut AstBuilder) -> T,
) -> (Typed, T) {
    let mut b = AstBuilder::new();
    let out = build(&mut b);
    let (ast, root) = b.finish();
    (type_ast(ast, root, config), out)
}

/// Type an already assembled arena.
pub(crate) fn type_ast(mut ast: Ast, root: NodeId, config: TypingConfig) -> Typed {
    let mut typing = Typing::with_config(&mut ast, config);
    let result = typing.type_program(root);
    let gaps = std::mem::take(&mut typing.coverage_gaps);
    let solutions = std::mem::take(&mut typing.length_solutions);
    let warnings = std::mem::take(&mut typing.warnings);
    drop(typing);
    Typed {
        ast,
        root,
        result,
        warnings,
        gaps,
        solutions,
    }
}
