use super::*;

#[test]
fn display_matches_variant_name() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::W0002.as_str(), "W0002");
}

#[test]
fn phases_come_from_first_digit() {
    assert_eq!(ErrorCode::E1002.phase(), Some(1));
    assert_eq!(ErrorCode::E2003.phase(), Some(2));
    assert_eq!(ErrorCode::E5002.phase(), Some(5));
    assert_eq!(ErrorCode::W0001.phase(), None);
}

#[test]
fn all_variants_are_unique_and_classified() {
    let mut seen = std::collections::BTreeSet::new();
    for code in ErrorCode::ALL {
        assert!(seen.insert(code.as_str()), "duplicate {code}");
        assert_eq!(code.is_warning(), code.phase().is_none(), "{code}");
    }
}
