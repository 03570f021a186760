use super::*;

#[test]
fn parses_every_radix() {
    assert_eq!(parse_int_literal("10"), Some(10));
    assert_eq!(parse_int_literal("0x1f"), Some(31));
    assert_eq!(parse_int_literal("0o17"), Some(15));
    assert_eq!(parse_int_literal("0b101"), Some(5));
    assert_eq!(parse_int_literal("1_000"), Some(1000));
}

#[test]
fn rejects_malformed_literals() {
    assert_eq!(parse_int_literal("0x"), None);
    assert_eq!(parse_int_literal("abc"), None);
    assert_eq!(parse_int_literal("18446744073709551616"), None);
}

#[test]
fn accessors_match_kind() {
    assert_eq!(Value::Int(3).as_int(), Some(3));
    assert_eq!(Value::Bool(true).as_int(), None);
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert_eq!(Value::Str("\"a\"".into()).kind_name(), "string");
}
