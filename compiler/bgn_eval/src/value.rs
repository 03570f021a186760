//! Values produced by constant evaluation.

use std::fmt;

/// Result of evaluating a constant expression.
///
/// Integers are stored as `u64` and reinterpreted as `i64` where the
/// operation is signed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    Int(u64),
    /// Raw literal text, quotes and escapes included.
    Str(String),
    /// An identifier's name (raw identifier mode).
    Ident(String),
}

impl Value {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Ident(_) => "identifier",
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            // Values above i64::MAX are shown unsigned.
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
            Value::Ident(name) => f.write_str(name),
        }
    }
}

/// Parse an integer literal as written: decimal, `0x`, `0o` or `0b`,
/// with optional `_` separators.
pub fn parse_int_literal(text: &str) -> Option<u64> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (digits, radix) = match cleaned.get(..2) {
        Some("0x" | "0X") => (&cleaned[2..], 16),
        Some("0o" | "0O") => (&cleaned[2..], 8),
        Some("0b" | "0B") => (&cleaned[2..], 2),
        _ => (cleaned.as_str(), 10),
    };
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests;
