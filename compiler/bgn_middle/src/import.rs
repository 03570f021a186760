//! `config.import("path")` resolution.
//!
//! Imported programs are loaded into the importing arena (see
//! [`Ast::append`]) and rewritten recursively before the importing call is
//! replaced. A program imported twice is loaded once; both `Import` nodes
//! share the same `import_desc`.

use bgn_diagnostic::{ErrorCode, LocationError};
use bgn_ir::{config_name, unescape, Ast, Call, Import, Loc, NodeId, StrLiteral};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::rewrite::{rewrite, Rewrite};

/// Where imported programs come from.
///
/// Paths are opaque to the resolver: two imports name the same program
/// exactly when `canonicalize` returns the same string for them.
pub trait ImportLoader {
    /// Canonical form of `path` as written in `from` (`None` for the root).
    fn canonicalize(&mut self, path: &str, from: Option<&str>) -> Result<String, ImportError>;

    /// Load an already canonical path into a fresh arena, returning it and
    /// its `Program` root.
    fn load(&mut self, canonical: &str) -> Result<(Ast, NodeId), ImportError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("cannot open file {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("cannot parse file {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ImportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ImportError::Open { .. } => ErrorCode::E1003,
            ImportError::Parse { .. } => ErrorCode::E1004,
        }
    }

    fn at(self, loc: Loc) -> LocationError {
        LocationError::new(self.code(), loc, self.to_string())
    }
}

/// State of one import resolution: the chain of files being imported and
/// every program loaded so far.
pub struct ImportResolver<'a> {
    loader: &'a mut dyn ImportLoader,
    stack: Vec<String>,
    programs: FxHashMap<String, NodeId>,
    files: Vec<String>,
}

impl<'a> ImportResolver<'a> {
    /// `root_path` is the canonical path of the program being compiled; it
    /// is file 0.
    pub fn new(loader: &'a mut dyn ImportLoader, root_path: impl Into<String>) -> Self {
        let root_path = root_path.into();
        ImportResolver {
            loader,
            stack: vec![root_path.clone()],
            programs: FxHashMap::default(),
            files: vec![root_path],
        }
    }

    /// Every file of the compilation unit, indexed by `Loc::file`.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn into_files(self) -> Vec<String> {
        self.files
    }

    /// Resolve every import under `root`, the program of the root file.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(&mut self, ast: &mut Ast, root: NodeId) -> Result<(), LocationError> {
        if let Some(root_path) = self.stack.first().cloned() {
            self.programs.insert(root_path, root);
        }
        rewrite(ast, root, self)?;
        tracing::debug!(files = self.files.len(), "imports resolved");
        Ok(())
    }

    fn import_path(&self, ast: &Ast, call: NodeId, arguments: &[NodeId]) -> Result<String, LocationError> {
        let malformed = |message: String| LocationError::new(ErrorCode::E1006, ast.loc(call), message);
        let [argument] = arguments else {
            return Err(malformed(format!(
                "config.import() takes 1 argument but got {}",
                arguments.len()
            )));
        };
        let Some(literal) = ast.get::<StrLiteral>(*argument) else {
            return Err(malformed(format!(
                "config.import() takes a string literal but got {:?}",
                ast.node_type(*argument)
            )));
        };
        unescape(&literal.value)
            .map_err(|e| malformed(format!("invalid path: cannot unescape {}: {e}", literal.value)))
    }

    fn load(&mut self, ast: &mut Ast, canonical: &str, loc: Loc) -> Result<NodeId, LocationError> {
        let (imported, root) = self.loader.load(canonical).map_err(|e| e.at(loc))?;
        let file = u32::try_from(self.files.len()).unwrap_or(u32::MAX);
        self.files.push(canonical.to_string());
        let root = ast.append(imported, file).node(root);
        tracing::debug!(path = canonical, file, "loaded import");

        self.stack.push(canonical.to_string());
        let resolved = rewrite(ast, root, self);
        self.stack.pop();
        let root = resolved?;
        self.programs.insert(canonical.to_string(), root);
        Ok(root)
    }
}

impl Rewrite for ImportResolver<'_> {
    type Error = LocationError;

    fn rewrite(&mut self, ast: &mut Ast, id: NodeId) -> Result<Option<NodeId>, LocationError> {
        let Some(Call { callee, arguments }) = ast.get::<Call>(id) else {
            return Ok(None);
        };
        if config_name(ast, *callee).as_deref() != Some("config.import") {
            return Ok(None);
        }
        let arguments = arguments.clone();
        let loc = ast.loc(id);
        let path = self.import_path(ast, id, &arguments)?;
        let from = self.stack.last().cloned();
        let canonical = self
            .loader
            .canonicalize(&path, from.as_deref())
            .map_err(|e| e.at(loc))?;
        if self.stack.contains(&canonical) {
            return Err(LocationError::new(
                ErrorCode::E1002,
                loc,
                format!("circular import detected: {canonical}"),
            ));
        }
        let import_desc = match self.programs.get(&canonical) {
            Some(&program) => program,
            None => self.load(ast, &canonical, loc)?,
        };
        Ok(Some(ast.alloc(
            loc,
            Import {
                path: canonical,
                base: id,
                import_desc,
            },
        )))
    }
}
