//! Escape handling for string literals.
//!
//! Literal text is stored as written, quotes included. Comparisons in the
//! constant evaluator and import paths work on the unescaped contents.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("string literal is not quoted")]
    NotQuoted,
    #[error("unterminated escape sequence at byte {0}")]
    Unterminated(usize),
    #[error("unknown escape sequence `\\{0}`")]
    Unknown(char),
    #[error("invalid hex escape at byte {0}")]
    BadHex(usize),
    #[error("invalid unicode escape at byte {0}")]
    BadUnicode(usize),
}

/// Unescape a quoted string literal (`"..."` or `'...'`).
pub fn unescape(literal: &str) -> Result<String, EscapeError> {
    let inner = strip_quotes(literal).ok_or(EscapeError::NotQuoted)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((pos, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            return Err(EscapeError::Unterminated(pos));
        };
        match esc {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
                let hex: String = chars.by_ref().take(2).map(|(_, h)| h).collect();
                let byte = u8::from_str_radix(&hex, 16).map_err(|_| EscapeError::BadHex(pos))?;
                out.push(char::from(byte));
            }
            'u' => {
                if chars.next().map(|(_, b)| b) != Some('{') {
                    return Err(EscapeError::BadUnicode(pos));
                }
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, h)) if hex.len() < 6 => hex.push(h),
                        _ => return Err(EscapeError::BadUnicode(pos)),
                    }
                }
                let code =
                    u32::from_str_radix(&hex, 16).map_err(|_| EscapeError::BadUnicode(pos))?;
                out.push(char::from_u32(code).ok_or(EscapeError::BadUnicode(pos))?);
            }
            other => return Err(EscapeError::Unknown(other)),
        }
    }
    Ok(out)
}

fn strip_quotes(literal: &str) -> Option<&str> {
    let quote = literal.chars().next()?;
    if !matches!(quote, '"' | '\'') || literal.len() < 2 || !literal.ends_with(quote) {
        return None;
    }
    Some(&literal[1..literal.len() - 1])
}

#[cfg(test)]
mod tests;
