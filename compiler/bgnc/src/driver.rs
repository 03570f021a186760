//! One compilation per input: decode, resolve imports, run the middle
//! passes, type, sort formats, encode.
//!
//! Inputs are independent compilation units with their own arenas, so
//! several of them are compiled in parallel.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bgn_diagnostic::{Diagnostic, ErrorCode};
use bgn_ir::{interchange, Ast, Format, NodeId};
use bgn_middle::{apply_middle, apply_post_typing, FormatSorter, ImportResolver};
use bgn_types::{Typing, TypingConfig};
use rayon::prelude::*;
use thiserror::Error;

use crate::config::{DriverConfig, Stream};
use crate::loader::FsLoader;
use crate::render::{render, summary, SourceMap};

/// Failures outside the program itself.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: interchange::DecodeError,
    },
    #[error("cannot encode the typed AST: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one compilation, worst last.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    /// Untyped expressions under `--unresolved-type-as-error`.
    Escalated,
    Failed,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Failed => 1,
            Status::Escalated => 2,
        }
    }
}

/// Result of compiling one input.
#[derive(Debug)]
pub struct Compiled {
    pub input: Stream,
    pub status: Status,
    pub diagnostics: Vec<Diagnostic>,
    pub sources: SourceMap,
    /// Format names in dependency order.
    pub order: Vec<String>,
    /// The typed AST, when the compilation succeeded.
    pub document: Option<String>,
}

impl Compiled {
    fn new(input: &Stream, sources: SourceMap) -> Self {
        Compiled {
            input: input.clone(),
            status: Status::Ok,
            diagnostics: Vec::new(),
            sources,
            order: Vec::new(),
            document: None,
        }
    }

    fn fail(mut self, status: Status, error: Diagnostic) -> Self {
        self.status = status;
        self.diagnostics.push(error);
        self
    }
}

/// Compile one input.
///
/// Program errors end up in [`Compiled::diagnostics`]; only unreadable or
/// malformed inputs are `Err`.
#[tracing::instrument(level = "debug", skip(config), fields(input = %input.display_name()))]
pub fn compile(config: &DriverConfig, input: &Stream) -> Result<Compiled, DriverError> {
    let text = read_input(input)?;
    let document = interchange::decode(&text).map_err(|source| DriverError::Decode {
        path: input.display_name(),
        source,
    })?;
    if config.check_ast {
        tracing::debug!(nodes = document.ast.len(), "document is valid");
        return Ok(Compiled::new(input, SourceMap::default()));
    }
    let interchange::Document {
        mut ast,
        root,
        files: source_files,
    } = document;

    let mut loader = FsLoader::new(config.search_paths.clone());
    let mut imports = ImportResolver::new(&mut loader, root_path(input));
    let middle = apply_middle(&mut ast, root, &mut imports);
    let mut files = imports.into_files();
    // Diagnostics in the root file point at its source, not its AST.
    if let (Some(first), Some(source)) = (files.first_mut(), source_files.into_iter().next()) {
        *first = source;
    }
    let compiled = Compiled::new(input, SourceMap::load(&files));
    if let Err(e) = middle {
        return Ok(compiled.fail(Status::Failed, e.into_diagnostic()));
    }

    let mut typing = Typing::with_config(
        &mut ast,
        TypingConfig {
            unresolved_type_as_error: config.unresolved_type_as_error,
        },
    );
    let typed = typing.type_program(root);
    let mut compiled = Compiled {
        diagnostics: typing.into_warnings(),
        ..compiled
    };
    if let Err(e) = typed {
        let status = if config.unresolved_type_as_error && e.code() == ErrorCode::E1007 {
            Status::Escalated
        } else {
            Status::Failed
        };
        return Ok(compiled.fail(status, e.into_diagnostic()));
    }
    if config.unresolved_type_as_error && !compiled.diagnostics.is_empty() {
        compiled.status = Status::Escalated;
        return Ok(compiled);
    }
    apply_post_typing(&mut ast, root);

    let mut value = interchange::encode_value(&ast, root, &files)?;
    if !config.no_sort {
        let formats = FormatSorter::sort(&ast, root);
        compiled.order = formats.iter().filter_map(|&f| format_name(&ast, f)).collect();
        if let serde_json::Value::Object(map) = &mut value {
            let indices: Vec<usize> = formats.iter().map(|f| f.index()).collect();
            map.insert("format_order".to_string(), serde_json::json!(indices));
        }
    }
    compiled.document = Some(serde_json::to_string_pretty(&value)?);
    tracing::debug!(
        files = files.len(),
        formats = compiled.order.len(),
        warnings = compiled.diagnostics.len(),
        "compiled"
    );
    Ok(compiled)
}

/// Compile every input; results are in input order.
pub fn compile_all(config: &DriverConfig) -> Vec<Result<Compiled, DriverError>> {
    if config.inputs.len() <= 1 {
        config.inputs.iter().map(|input| compile(config, input)).collect()
    } else {
        config
            .inputs
            .par_iter()
            .map(|input| compile(config, input))
            .collect()
    }
}

/// Write the typed AST of `compiled` where the configuration asks.
///
/// A single input goes to `--output` or stdout. Several inputs go into the
/// `--output` directory, or next to each input, as `<name>.typed.json`.
pub fn write_output(config: &DriverConfig, compiled: &Compiled) -> Result<(), DriverError> {
    let Some(document) = &compiled.document else {
        return Ok(());
    };
    let many = config.inputs.len() > 1;
    let target = match (&config.output, many) {
        (Some(Stream::Std), _) | (None, false) => None,
        (Some(Stream::Path(path)), false) => Some(path.clone()),
        (Some(Stream::Path(dir)), true) => {
            fs::create_dir_all(dir).map_err(|source| DriverError::Write {
                path: dir.display().to_string(),
                source,
            })?;
            Some(dir.join(typed_name(&compiled.input)))
        }
        (None, true) => Some(beside_input(&compiled.input)),
    };
    match target {
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{document}").map_err(|source| DriverError::Write {
                path: "<stdout>".to_string(),
                source,
            })
        }
        Some(path) => fs::write(&path, document).map_err(|source| DriverError::Write {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Compile, report and write everything; returns the process exit code.
pub fn run(config: &DriverConfig) -> i32 {
    let mut worst = Status::Ok;
    let (mut errors, mut warnings) = (0usize, 0usize);
    for result in compile_all(config) {
        let compiled = match result {
            Ok(compiled) => compiled,
            Err(e) => {
                eprintln!("error: {e}");
                errors += 1;
                worst = worst.max(Status::Failed);
                continue;
            }
        };
        for diagnostic in &compiled.diagnostics {
            eprint!("{}", render(diagnostic, &compiled.sources));
            if diagnostic.is_error() {
                errors += 1;
            } else {
                warnings += 1;
            }
        }
        if config.print_order {
            for name in &compiled.order {
                println!("{name}");
            }
        }
        if let Err(e) = write_output(config, &compiled) {
            eprintln!("error: {e}");
            errors += 1;
            worst = worst.max(Status::Failed);
        }
        worst = worst.max(compiled.status);
    }
    if let Some(line) = summary(errors, warnings) {
        eprintln!("{line}");
    }
    worst.exit_code()
}

fn read_input(input: &Stream) -> Result<String, DriverError> {
    let text = match input {
        Stream::Std => io::read_to_string(io::stdin()),
        Stream::Path(path) => fs::read_to_string(path),
    };
    text.map_err(|source| DriverError::Read {
        path: input.display_name(),
        source,
    })
}

/// File 0 of the compilation; imports are looked up next to it.
fn root_path(input: &Stream) -> String {
    match input {
        Stream::Std => input.display_name(),
        Stream::Path(path) => fs::canonicalize(path)
            .unwrap_or_else(|_| path.clone())
            .to_string_lossy()
            .into_owned(),
    }
}

fn format_name(ast: &Ast, format: NodeId) -> Option<String> {
    let format = ast.get::<Format>(format)?;
    ast.ident_name(format.ident).map(str::to_string)
}

/// `a.bgn.json` becomes `a.bgn.typed.json`.
fn typed_name(input: &Stream) -> String {
    let name = match input {
        Stream::Std => "stdin".to_string(),
        Stream::Path(path) => path
            .file_name()
            .map_or_else(|| "out".to_string(), |n| n.to_string_lossy().into_owned()),
    };
    let stem = name.strip_suffix(".json").unwrap_or(&name);
    format!("{stem}.typed.json")
}

fn beside_input(input: &Stream) -> PathBuf {
    let dir = match input {
        Stream::Path(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        Stream::Std => PathBuf::new(),
    };
    dir.join(typed_name(input))
}
