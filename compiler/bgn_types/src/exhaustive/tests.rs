use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn domains_cover_the_full_integer_range() {
    assert_eq!(Coverage::domain(8, false), Interval::new(0, 255));
    assert_eq!(Coverage::domain(8, true), Interval::new(-128, 127));
    assert_eq!(
        Coverage::domain(64, false),
        Interval::new(0, i128::from(u64::MAX))
    );
    assert_eq!(
        Coverage::domain(64, true),
        Interval::new(i128::from(i64::MIN), i128::from(i64::MAX))
    );
    assert_eq!(Coverage::domain(0, false), Interval::new(0, 1), "clamped to one bit");
}

#[test]
fn two_halves_cover_a_byte() {
    let mut c = Coverage::new(Coverage::domain(8, false));
    assert!(c.subtract(Interval::new(0, 127)));
    assert_eq!(c.gaps(), &[Interval::new(128, 255)]);
    assert!(c.subtract(Interval::new(128, 255)));
    assert!(c.is_empty());
    assert!(!c.subtract(Interval::new(0, 10)), "nothing left to remove");
}

#[test]
fn subtracting_from_the_middle_splits_a_gap() {
    let mut c = Coverage::new(Interval::new(0, 10));
    c.subtract(Interval::point(5));
    assert_eq!(c.gaps(), &[Interval::new(0, 4), Interval::new(6, 10)]);
    c.subtract(Interval::new(-3, 2));
    c.subtract(Interval::new(9, 40));
    assert_eq!(c.into_gaps(), vec![Interval::new(3, 4), Interval::new(6, 8)]);
}

#[test]
fn empty_intervals_remove_nothing() {
    let mut c = Coverage::new(Interval::new(0, 3));
    assert!(!c.subtract(Interval::new(2, 1)));
    assert_eq!(c.gaps(), &[Interval::new(0, 3)]);
}

#[test]
fn intervals_display_like_patterns() {
    assert_eq!(Interval::point(7).to_string(), "7");
    assert_eq!(Interval::new(-1, 3).to_string(), "-1..=3");
}

proptest! {
    /// After any sequence of subtractions the gaps stay sorted and disjoint,
    /// and hold exactly the values no subtraction touched.
    #[test]
    fn gaps_hold_exactly_the_uncovered_values(
        cuts in prop::collection::vec((0i128..64, 0i128..64), 0..8),
    ) {
        let mut c = Coverage::new(Interval::new(0, 63));
        for &(a, b) in &cuts {
            c.subtract(Interval::new(a.min(b), a.max(b)));
        }
        for pair in c.gaps().windows(2) {
            prop_assert!(pair[0].end + 1 < pair[1].start);
        }
        for v in 0..64 {
            let covered = cuts.iter().any(|&(a, b)| a.min(b) <= v && v <= a.max(b));
            let in_gap = c.gaps().iter().any(|g| g.contains(v));
            prop_assert_eq!(covered, !in_gap, "value {}", v);
        }
    }
}
