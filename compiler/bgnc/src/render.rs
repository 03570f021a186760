//! Human-readable diagnostics.
//!
//! Diagnostics point into source files the external parser read; the driver
//! only sees their JSON ASTs. A [`SourceMap`] holds whatever source text it
//! could find next to each AST (`a.bgn.json` is shown against `a.bgn`), and
//! [`render`] draws a snippet through `ariadne` when the text is there,
//! falling back to a `file:line:col` header otherwise.

use std::fmt::Write as _;
use std::fs;
use std::ops::Range;

use ariadne::{Config, Label as SnippetLabel, Report, ReportKind};
use bgn_diagnostic::{Diagnostic, Severity};
use bgn_ir::Loc;

/// Source text of each file of a compilation, indexed like `Loc::file`.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    files: Vec<(String, Option<String>)>,
}

impl SourceMap {
    /// Read the source behind every file name that can be found.
    pub fn load(files: &[String]) -> Self {
        let files = files
            .iter()
            .map(|name| {
                let source = name.strip_suffix(".json").unwrap_or(name);
                let text = fs::read_to_string(source).ok();
                (name.clone(), text)
            })
            .collect();
        SourceMap { files }
    }

    pub fn from_texts(files: Vec<(String, Option<String>)>) -> Self {
        SourceMap { files }
    }

    pub fn name(&self, file: u32) -> &str {
        self.files
            .get(file as usize)
            .map_or("<unknown>", |(name, _)| name.as_str())
    }

    fn text(&self, file: u32) -> Option<&str> {
        self.files.get(file as usize)?.1.as_deref()
    }
}

/// Render one diagnostic without color.
pub fn render(diagnostic: &Diagnostic, sources: &SourceMap) -> String {
    let snippet = diagnostic
        .primary_loc()
        .and_then(|loc| sources.text(loc.file).map(|text| (loc, text)))
        .and_then(|(loc, text)| snippet(diagnostic, sources, loc, text));
    snippet.unwrap_or_else(|| plain(diagnostic, sources))
}

/// One-line summary after all diagnostics of a run.
pub fn summary(errors: usize, warnings: usize) -> Option<String> {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    match (errors, warnings) {
        (0, 0) => None,
        (0, w) => Some(format!("warning: {w} warning{} emitted", plural(w))),
        (1, 0) => Some("error: aborting due to previous error".to_string()),
        (e, 0) => Some(format!("error: aborting due to {e} previous errors")),
        (e, w) => Some(format!(
            "error: aborting due to {e} previous error{}; {w} warning{} emitted",
            plural(e),
            plural(w)
        )),
    }
}

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Note | Severity::Help => ReportKind::Advice,
    }
}

/// Byte span of `loc` as a character range inside `text`.
///
/// ariadne counts characters; spans past the end are clamped.
fn char_range(loc: Loc, text: &str) -> Range<usize> {
    let to_char = |byte: u32| {
        let mut byte = (byte as usize).min(text.len());
        while !text.is_char_boundary(byte) {
            byte -= 1;
        }
        text[..byte].chars().count()
    };
    let start = to_char(loc.span.start);
    let end = to_char(loc.span.end).max(start);
    start..end
}

fn snippet(diagnostic: &Diagnostic, sources: &SourceMap, primary: Loc, text: &str) -> Option<String> {
    let name = sources.name(primary.file).to_string();
    let range = char_range(primary, text);
    let mut report = Report::<(String, Range<usize>)>::build(
        report_kind(diagnostic.severity),
        name.clone(),
        range.start,
    )
    .with_code(diagnostic.code)
    .with_message(&diagnostic.message)
    .with_config(Config::default().with_color(false));

    // Labels in other files cannot share the snippet.
    for label in diagnostic.labels.iter().filter(|l| l.loc.file == primary.file) {
        let span = (name.clone(), char_range(label.loc, text));
        let mut snippet_label = SnippetLabel::new(span).with_message(&label.message);
        if label.is_primary {
            snippet_label = snippet_label.with_order(-1);
        }
        report = report.with_label(snippet_label);
    }
    if !diagnostic.notes.is_empty() {
        report = report.with_note(diagnostic.notes.join("\n"));
    }
    if !diagnostic.suggestions.is_empty() {
        report = report.with_help(diagnostic.suggestions.join("\n"));
    }

    let mut out = Vec::new();
    report
        .finish()
        .write(ariadne::sources([(name, text.to_string())]), &mut out)
        .ok()?;
    String::from_utf8(out).ok()
}

fn plain(diagnostic: &Diagnostic, sources: &SourceMap) -> String {
    let mut out = format!(
        "{}[{}]: {}\n",
        diagnostic.severity, diagnostic.code, diagnostic.message
    );
    for label in &diagnostic.labels {
        let marker = if label.is_primary { "-->" } else { "   " };
        let _ = write!(
            out,
            "  {marker} {}:{}:{}",
            sources.name(label.loc.file),
            label.loc.line,
            label.loc.col
        );
        if label.message.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, ": {}", label.message);
        }
    }
    for note in &diagnostic.notes {
        let _ = writeln!(out, "  = note: {note}");
    }
    for suggestion in &diagnostic.suggestions {
        let _ = writeln!(out, "  = help: {suggestion}");
    }
    out
}
