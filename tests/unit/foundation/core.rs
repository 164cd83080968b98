use super::*;

#[test]
fn generated_ids_are_unique_and_fixed_width() {
    let ids: std::collections::BTreeSet<NodeId> = (0..1000).map(|_| NodeId::generate()).collect();
    assert_eq!(ids.len(), 1000);
    for id in &ids {
        assert_eq!(id.as_str().len(), 12);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn empty_id_is_a_schema_error() {
    assert!(matches!(NodeId::new("  "), Err(ArtificeError::Schema(_))));
    assert_eq!(NodeId::new("abc").unwrap().as_str(), "abc");
}

#[test]
fn ids_order_lexically() {
    let a = NodeId::new("a1").unwrap();
    let b = NodeId::new("b0").unwrap();
    assert!(a < b);
}

#[test]
fn port_ref_displays_as_node_dot_port() {
    let r = PortRef::new(NodeId::new("n1").unwrap(), "image");
    assert_eq!(r.to_string(), "n1.image");
}
