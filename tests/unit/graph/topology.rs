use super::*;

fn id(s: &str) -> NodeId {
    NodeId::new(s).unwrap()
}

fn edge(a: &str, b: &str) -> Connection {
    Connection::new(id(a), "out", id(b), "in")
}

#[test]
fn order_is_topological_with_lexical_tie_break() {
    // d -> b, c -> b, b -> a
    let nodes = [id("a"), id("b"), id("c"), id("d")];
    let conns = vec![edge("d", "b"), edge("c", "b"), edge("b", "a")];
    let order = execution_order(nodes.iter(), &conns).unwrap();
    assert_eq!(order, vec![id("c"), id("d"), id("b"), id("a")]);
    assert_eq!(order, execution_order(nodes.iter(), &conns).unwrap());
}

#[test]
fn parallel_edges_between_one_pair_are_counted_once_each() {
    let nodes = [id("a"), id("b")];
    let conns = vec![
        Connection::new(id("a"), "x", id("b"), "p"),
        Connection::new(id("a"), "y", id("b"), "q"),
    ];
    let order = execution_order(nodes.iter(), &conns).unwrap();
    assert_eq!(order, vec![id("a"), id("b")]);
}

#[test]
fn cycles_are_reported() {
    let nodes = [id("a"), id("b")];
    let conns = vec![edge("a", "b"), edge("b", "a")];
    assert!(matches!(
        execution_order(nodes.iter(), &conns),
        Err(ArtificeError::CycleRejected(_))
    ));
}

#[test]
fn reachability_follows_edge_direction() {
    let conns = vec![edge("a", "b"), edge("b", "c")];
    assert!(reaches(&conns, &id("a"), &id("c")));
    assert!(!reaches(&conns, &id("c"), &id("a")));
    assert!(reaches(&conns, &id("b"), &id("b")));
}

#[test]
fn downstream_includes_seeds_and_skips_siblings() {
    // a -> b -> c, a -> d, e -> c
    let conns = vec![edge("a", "b"), edge("b", "c"), edge("a", "d"), edge("e", "c")];
    let seed = id("b");
    let set = downstream(&conns, [&seed]);
    let got: Vec<&str> = set.iter().map(|n| n.as_str()).collect();
    assert_eq!(got, vec!["b", "c"]);
}
