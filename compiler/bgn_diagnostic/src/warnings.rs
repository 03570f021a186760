//! Accumulator for recoverable diagnostics.

use std::collections::HashSet;

use bgn_ir::Loc;

use crate::{Diagnostic, ErrorCode};

/// Warning sink threaded by `&mut` through a pass.
///
/// Re-entrant force-typing can report the same warning more than once, so
/// [`Warnings::finish`] normalizes: stable sort by byte offset, then drop
/// exact duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Warnings {
    items: Vec<Diagnostic>,
}

impl Warnings {
    pub fn new() -> Self {
        Warnings::default()
    }

    /// Report a warning at `loc`.
    pub fn warn(&mut self, code: ErrorCode, loc: Loc, message: impl Into<String>) {
        tracing::debug!(%code, line = loc.line, col = loc.col, "warning");
        self.items.push(
            Diagnostic::warning(code)
                .with_message(message)
                .with_label(loc, ""),
        );
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Whether any collected diagnostic carries `code`.
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Sorted, deduplicated diagnostics.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.items
            .sort_by_key(|d| d.primary_loc().map_or(0, |l| l.span.start));
        let mut seen = HashSet::new();
        self.items.retain(|d| seen.insert(d.clone()));
        self.items
    }
}

#[cfg(test)]
mod tests;
