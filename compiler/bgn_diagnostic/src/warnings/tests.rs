use super::*;
use bgn_ir::Span;
use pretty_assertions::assert_eq;

fn at(start: u32) -> Loc {
    Loc::new(Span::new(start, start + 1), 0, 1, start + 1)
}

#[test]
fn finish_sorts_by_offset_keeping_order_of_ties() {
    let mut w = Warnings::new();
    w.warn(ErrorCode::W0002, at(20), "maybe unreachable code");
    w.warn(ErrorCode::W0003, at(5), "second at 5");
    w.warn(ErrorCode::W0001, at(5), "later at 5");
    let messages: Vec<_> = w.finish().into_iter().map(|d| d.message).collect();
    assert_eq!(
        messages,
        vec![
            "second at 5".to_string(),
            "later at 5".to_string(),
            "maybe unreachable code".to_string(),
        ]
    );
}

#[test]
fn finish_removes_exact_duplicates() {
    let mut w = Warnings::new();
    w.warn(ErrorCode::W0002, at(3), "maybe unreachable code");
    w.warn(ErrorCode::W0002, at(3), "maybe unreachable code");
    w.warn(ErrorCode::W0002, at(4), "maybe unreachable code");
    assert_eq!(w.len(), 3);
    assert_eq!(w.finish().len(), 2);
}

#[test]
fn duplicates_separated_by_other_offsets_still_merge() {
    let mut w = Warnings::new();
    w.warn(ErrorCode::W0001, at(8), "skipped");
    w.warn(ErrorCode::W0001, at(1), "other");
    w.warn(ErrorCode::W0001, at(8), "skipped");
    assert_eq!(w.finish().len(), 2);
}

#[test]
fn contains_checks_codes() {
    let mut w = Warnings::new();
    assert!(w.is_empty());
    w.warn(ErrorCode::W0003, at(0), "endian overwritten");
    assert!(w.contains(ErrorCode::W0003));
    assert!(!w.contains(ErrorCode::W0002));
}
