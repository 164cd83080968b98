use super::*;

fn id(s: &str) -> NodeId {
    NodeId::new(s).unwrap()
}

fn sample(registry: &NodeRegistry) -> NodeGraph {
    let mut g = NodeGraph::named("glitch");
    let mut card = registry.create_with_id("TestCardNode", id("card")).unwrap();
    card.set_position(Point::new(10.0, -20.5));
    card.set_parameter("size", 256).unwrap();
    let mut flip = registry.create_with_id("BitFlipNode", id("flip")).unwrap();
    flip.set_parameter("probability", 0.2).unwrap();
    let null = registry.create_with_id("NullNode", id("out")).unwrap();
    g.add_node(card).unwrap();
    g.add_node(flip).unwrap();
    g.add_node(null).unwrap();
    g.connect(&id("card"), "image", &id("flip"), "image").unwrap();
    g.connect(&id("flip"), "image", &id("out"), "image").unwrap();
    g
}

#[test]
fn round_trip_preserves_structure_and_parameters() {
    let registry = NodeRegistry::with_builtin_nodes();
    let g = sample(&registry);
    let doc = g.to_document();
    let text = doc.to_json_string().unwrap();

    let restored = NodeGraph::from_document(GraphDocument::from_json_str(&text).unwrap(), &registry)
        .unwrap();
    assert_eq!(restored.to_document(), doc);
    assert_eq!(restored.name(), Some("glitch"));

    let card = restored.node(&id("card")).unwrap();
    assert_eq!(card.position(), Point::new(10.0, -20.5));
    assert_eq!(card.get_parameter("size").unwrap(), &ParamValue::Int(256));
    assert!(card.is_dirty());
    assert_eq!(
        restored.execution_order().unwrap(),
        vec![id("card"), id("flip"), id("out")]
    );
}

#[test]
fn json_uses_type_tags_and_flat_connections() {
    let registry = NodeRegistry::with_builtin_nodes();
    let json: serde_json::Value =
        serde_json::from_str(&sample(&registry).to_json_string().unwrap()).unwrap();
    assert_eq!(json["name"], "glitch");
    assert_eq!(json["nodes"][0]["type"], "TestCardNode");
    assert_eq!(json["nodes"][0]["id"], "card");
    assert_eq!(json["nodes"][0]["parameters"]["size"], 256);
    assert_eq!(json["connections"][0]["source_node"], "card");
    assert_eq!(json["connections"][0]["dest_port"], "image");
}

#[test]
fn optional_sections_default() {
    let registry = NodeRegistry::with_builtin_nodes();
    let doc = GraphDocument::from_json_str(r#"{"nodes":[{"type":"NullNode","id":"n"}]}"#).unwrap();
    assert!(doc.connections.is_empty());
    let g = NodeGraph::from_document(doc, &registry).unwrap();
    assert_eq!(g.node(&id("n")).unwrap().position(), Point::ZERO);
    assert_eq!(g.name(), None);
}

#[test]
fn unknown_node_types_fail_the_load() {
    let registry = NodeRegistry::with_builtin_nodes();
    let doc = GraphDocument::from_json_str(r#"{"nodes":[{"type":"Teleporter","id":"t"}]}"#)
        .unwrap();
    assert!(matches!(
        NodeGraph::from_document(doc, &registry),
        Err(ArtificeError::UnknownNodeType(name)) if name == "Teleporter"
    ));
}

#[test]
fn aliases_resolve_to_their_target() {
    let registry = NodeRegistry::with_builtin_nodes();
    let doc = GraphDocument::from_json_str(r#"{"nodes":[{"type":"PassThroughNode","id":"p"}]}"#)
        .unwrap();
    let g = NodeGraph::from_document(doc, &registry).unwrap();
    assert_eq!(g.node(&id("p")).unwrap().type_name(), "NullNode");
}

#[test]
fn cyclic_documents_are_rejected() {
    let registry = NodeRegistry::with_builtin_nodes();
    let text = r#"{
        "nodes": [{"type":"NullNode","id":"a"},{"type":"NullNode","id":"b"}],
        "connections": [
            {"source_node":"a","source_port":"image","dest_node":"b","dest_port":"image"},
            {"source_node":"b","source_port":"image","dest_node":"a","dest_port":"image"}
        ]
    }"#;
    let doc = GraphDocument::from_json_str(text).unwrap();
    assert!(matches!(
        NodeGraph::from_document(doc, &registry),
        Err(ArtificeError::CycleRejected(_))
    ));
}

#[test]
fn bad_parameters_are_skipped_not_fatal() {
    let registry = NodeRegistry::with_builtin_nodes();
    let text = r#"{"nodes":[{"type":"TestCardNode","id":"c",
        "parameters":{"size":"huge","seed":7,"sparkle":true}}]}"#;
    let g = NodeGraph::from_document(GraphDocument::from_json_str(text).unwrap(), &registry)
        .unwrap();
    let card = g.node(&id("c")).unwrap();
    assert_eq!(card.get_parameter("size").unwrap(), &ParamValue::Int(512));
    assert_eq!(card.get_parameter("seed").unwrap(), &ParamValue::Int(7));
}

#[test]
fn malformed_documents_are_schema_errors() {
    assert!(matches!(
        GraphDocument::from_json_str("{\"nodes\": 3}"),
        Err(ArtificeError::Schema(_))
    ));
    let registry = NodeRegistry::with_builtin_nodes();
    let doc = GraphDocument::from_json_str(r#"{"nodes":[{"type":"NullNode","id":"  "}]}"#)
        .unwrap();
    assert!(matches!(
        NodeGraph::from_document(doc, &registry),
        Err(ArtificeError::Schema(_))
    ));
}

#[test]
fn save_and_load_through_the_filesystem() {
    let registry = NodeRegistry::with_builtin_nodes();
    let g = sample(&registry);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "artifice_document_{}_{nanos}",
        std::process::id()
    ));
    let path = dir.join("nested").join("graph.json");

    g.save(&path).unwrap();
    let loaded = NodeGraph::load(&path, &registry).unwrap();
    assert_eq!(loaded.to_document(), g.to_document());

    assert!(matches!(
        NodeGraph::load(&dir.join("missing.json"), &registry),
        Err(ArtificeError::Io(_))
    ));
    let _ = std::fs::remove_dir_all(&dir);
}
