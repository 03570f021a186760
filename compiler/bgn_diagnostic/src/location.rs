//! The single fatal error type of the typing passes.

use bgn_ir::Loc;
use thiserror::Error;

use crate::{Diagnostic, ErrorCode};

/// A fatal diagnostic anchored at a node.
///
/// Boxed so `Result<T, LocationError>` stays one pointer wide on the error
/// path of the deeply recursive typing functions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct LocationError(Box<Diagnostic>);

impl LocationError {
    #[cold]
    pub fn new(code: ErrorCode, loc: Loc, message: impl Into<String>) -> Self {
        let message = message.into();
        LocationError(Box::new(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(loc, ""),
        ))
    }

    /// Attach a note to the diagnostic.
    #[must_use]
    pub fn with_note(self, note: impl Into<String>) -> Self {
        LocationError(Box::new(self.0.with_note(note)))
    }

    /// Point at a related location, such as an earlier definition.
    #[must_use]
    pub fn with_secondary_label(self, loc: Loc, message: impl Into<String>) -> Self {
        LocationError(Box::new(self.0.with_secondary_label(loc, message)))
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }

    pub fn message(&self) -> &str {
        &self.0.message
    }

    pub fn loc(&self) -> Option<Loc> {
        self.0.primary_loc()
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        *self.0
    }
}

impl From<Diagnostic> for LocationError {
    fn from(diagnostic: Diagnostic) -> Self {
        LocationError(Box::new(diagnostic))
    }
}
