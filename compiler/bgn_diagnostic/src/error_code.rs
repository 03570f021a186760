//! Error codes for all front-end diagnostics.
//!
//! Each code is a unique identifier (e.g. `E2001`) whose first digit names
//! the phase that reports it.

use std::fmt;

macro_rules! error_codes {
    ($( $(#[doc = $doc:literal])* $code:ident, )*) => {
        /// Error codes for all front-end diagnostics.
        ///
        /// Format: E#### where the first digit indicates phase:
        /// - E1xxx: resolution and import
        /// - E2xxx: typing
        /// - E3xxx: match and patterns
        /// - E4xxx: field layout
        /// - E5xxx: constant evaluation
        /// - E6xxx: AST interchange
        /// - W0xxx: warnings
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
        pub enum ErrorCode {
            $( $(#[doc = $doc])* $code, )*
        }

        impl ErrorCode {
            /// All codes, in declaration order.
            pub const ALL: &[ErrorCode] = &[$(ErrorCode::$code,)*];

            /// The code as written in output (e.g. "E2001").
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(ErrorCode::$code => stringify!($code),)*
                }
            }
        }
    };
}

error_codes! {
    // Resolution / import (E1xxx)
    /// Identifier is not defined
    E1001,
    /// Circular import
    E1002,
    /// Imported file cannot be opened
    E1003,
    /// Imported file cannot be parsed
    E1004,
    /// Circular constant definition
    E1005,
    /// Malformed `config.import` call
    E1006,
    /// Expression left without a type
    E1007,

    // Typing (E2xxx)
    /// Type mismatch
    E2001,
    /// Operator not valid for operand types
    E2002,
    /// Integer literal does not fit the target type
    E2003,
    /// Assignment to a constant
    E2004,
    /// Value cannot be iterated by `for in`
    E2005,
    /// Call target is not callable, or argument count differs
    E2006,
    /// Invalid cast
    E2007,
    /// Unknown member
    E2008,
    /// Indexing a non-array
    E2009,
    /// Builtin called with wrong arguments
    E2010,
    /// Range endpoints disagree
    E2011,
    /// Name used as a type does not name one
    E2012,

    // Match (E3xxx)
    /// Branch pattern not comparable with the scrutinee
    E3001,
    /// Branch condition of a trial match is not boolean
    E3002,
    /// Wildcard branch duplicated or misplaced
    E3003,
    /// Pattern range start exceeds its end
    E3004,

    // Field layout (E4xxx)
    /// `config.type` argument is not a type
    E4001,
    /// Wire type given twice
    E4002,
    /// Fixed-value argument matches neither the field nor its element type
    E4003,
    /// `input.subrange` argument count
    E4004,

    // Constant evaluation (E5xxx)
    /// Expression is not constant
    E5001,
    /// Division or modulo by zero
    E5002,
    /// Operand kinds not valid for the operator
    E5003,
    /// String literal cannot be unescaped
    E5004,
    /// Identifier where none is allowed
    E5005,
    /// Expression kind not supported by the evaluator or resolver
    E5006,

    // Interchange (E6xxx)
    /// AST document malformed or inconsistent
    E6001,

    // Warnings (W0xxx)
    /// Expression skipped because it could not be typed
    W0001,
    /// Branch can never be taken
    W0002,
    /// Byte order directive overridden by a later one
    W0003,
}

impl ErrorCode {
    pub fn is_warning(self) -> bool {
        self.as_str().starts_with('W')
    }

    /// Phase digit of an error code; `None` for warnings.
    pub fn phase(self) -> Option<u8> {
        let s = self.as_str();
        if self.is_warning() {
            return None;
        }
        s.as_bytes().get(1).map(|d| d - b'0')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
