//! Import loading from the file system.
//!
//! An import names a JSON AST, either directly (`config.import("a.json")`)
//! or through its source name (`config.import("a.bgn")` finds
//! `a.bgn.json`). Paths are tried relative to the importing file first, then
//! in each search path, in order.

use std::fs;
use std::path::{Path, PathBuf};

use bgn_ir::{interchange, Ast, NodeId};
use bgn_middle::{ImportError, ImportLoader};

#[derive(Clone, Debug, Default)]
pub struct FsLoader {
    search_paths: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        FsLoader { search_paths }
    }

    /// Files that may hold `path` imported from `from`, most preferred
    /// first.
    fn candidates(&self, path: &str, from: Option<&str>) -> Vec<PathBuf> {
        let mut bases: Vec<PathBuf> = Vec::new();
        match from.map(Path::new).and_then(Path::parent) {
            Some(dir) => bases.push(dir.to_path_buf()),
            None => bases.push(PathBuf::new()),
        }
        bases.extend(self.search_paths.iter().cloned());
        bases
            .iter()
            .flat_map(|base| [base.join(path), base.join(format!("{path}.json"))])
            .collect()
    }
}

impl ImportLoader for FsLoader {
    fn canonicalize(&mut self, path: &str, from: Option<&str>) -> Result<String, ImportError> {
        let Some(found) = self.candidates(path, from).into_iter().find(|c| c.is_file()) else {
            return Err(ImportError::Open {
                path: path.to_string(),
                reason: "not found next to the importing file or in any search path".to_string(),
            });
        };
        let canonical = fs::canonicalize(&found).map_err(|e| ImportError::Open {
            path: found.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::trace!(path, canonical = %canonical.display(), "import located");
        Ok(canonical.to_string_lossy().into_owned())
    }

    fn load(&mut self, canonical: &str) -> Result<(Ast, NodeId), ImportError> {
        let text = fs::read_to_string(canonical).map_err(|e| ImportError::Open {
            path: canonical.to_string(),
            reason: e.to_string(),
        })?;
        let document = interchange::decode(&text).map_err(|e| ImportError::Parse {
            path: canonical.to_string(),
            reason: e.to_string(),
        })?;
        Ok((document.ast, document.root))
    }
}

#[cfg(test)]
mod tests;
