use super::*;

#[test]
fn index_round_trips_raw_value() {
    let id = NodeId::new(42);
    assert_eq!(id.index(), 42);
    assert_eq!(id.raw(), 42);
}

#[test]
fn debug_names_the_handle_kind() {
    assert_eq!(format!("{:?}", NodeId::new(3)), "NodeId(3)");
    assert_eq!(format!("{:?}", ScopeId::new(7)), "ScopeId(7)");
}

#[test]
fn handles_order_by_index() {
    assert!(NodeId::new(1) < NodeId::new(2));
}
