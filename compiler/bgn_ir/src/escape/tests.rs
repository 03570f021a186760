use super::*;
use pretty_assertions::assert_eq;

#[test]
fn plain_text_passes_through() {
    assert_eq!(unescape("\"abc\""), Ok("abc".to_string()));
}

#[test]
fn common_escapes() {
    assert_eq!(
        unescape(r#""a\nb\t\"q\"\\""#),
        Ok("a\nb\t\"q\"\\".to_string())
    );
}

#[test]
fn hex_and_unicode_escapes() {
    assert_eq!(unescape(r#""\x41\u{1F600}""#), Ok("A\u{1F600}".to_string()));
}

#[test]
fn single_quotes_accepted() {
    assert_eq!(unescape("'x'"), Ok("x".to_string()));
}

#[test]
fn errors_are_reported() {
    assert_eq!(unescape("abc"), Err(EscapeError::NotQuoted));
    assert_eq!(unescape(r#""\q""#), Err(EscapeError::Unknown('q')));
    assert_eq!(unescape(r#""\xZZ""#), Err(EscapeError::BadHex(0)));
    assert_eq!(unescape(r#""\u{110000}""#), Err(EscapeError::BadUnicode(0)));
    assert_eq!(unescape("\"\\\""), Err(EscapeError::Unterminated(0)));
}
