use super::*;
use bgn_ir::Span;
use pretty_assertions::assert_eq;

fn loc(start: u32, line: u32, col: u32) -> Loc {
    Loc::new(Span::new(start, start + 1), 0, line, col)
}

#[test]
fn builder_collects_parts() {
    let d = Diagnostic::error(ErrorCode::E2001)
        .with_message("type mismatch")
        .with_label(loc(4, 1, 5), "expected u8")
        .with_secondary_label(loc(0, 1, 1), "declared here")
        .with_note("fields are not widened")
        .with_suggestion("add a cast");

    assert!(d.is_error());
    assert_eq!(d.labels.len(), 2);
    assert_eq!(d.primary_loc(), Some(loc(4, 1, 5)));
    assert_eq!(d.notes, vec!["fields are not widened".to_string()]);
}

#[test]
fn display_renders_code_and_position() {
    let d = Diagnostic::warning(ErrorCode::W0002)
        .with_message("maybe unreachable code")
        .with_label(loc(9, 3, 2), "");
    assert_eq!(d.to_string(), "warning[W0002]: maybe unreachable code at 3:2");
}

#[test]
fn diagnostic_without_label_has_no_position() {
    let d = Diagnostic::error(ErrorCode::E1003).with_message("cannot open file");
    assert_eq!(d.primary_loc(), None);
    assert_eq!(d.to_string(), "error[E1003]: cannot open file");
}
