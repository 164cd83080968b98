use super::*;
use crate::backend::cpu::CpuBackend;
use crate::node::node::Node;

#[test]
fn card_has_expected_bands() {
    let card = generate_test_card(64, 1).unwrap();
    assert_eq!((card.width(), card.height(), card.channels()), (64, 64, 3));

    // Hue sweep starts at pure red.
    assert_eq!(card.pixel(0, 0).unwrap(), &[1.0, 0.0, 0.0]);
    // Grey ramp runs from black to white.
    assert_eq!(card.pixel(0, 16).unwrap(), &[0.0, 0.0, 0.0]);
    assert_eq!(card.pixel(63, 16).unwrap(), &[1.0, 1.0, 1.0]);
    // Checkerboard alternates per cell.
    assert_ne!(card.pixel(0, 32).unwrap(), card.pixel(4, 32).unwrap());
}

#[test]
fn seed_controls_noise_band_only() {
    let a = generate_test_card(64, 1).unwrap();
    let b = generate_test_card(64, 1).unwrap();
    let c = generate_test_card(64, 2).unwrap();
    assert_eq!(a.samples(), b.samples());

    let split = 64 * 48 * 3;
    assert_eq!(a.samples()[..split], c.samples()[..split]);
    assert_ne!(a.samples()[split..], c.samples()[split..]);
}

#[test]
fn node_respects_size_bounds() {
    let mut node = Node::from_kind(TestCardNode);
    node.set_parameter("size", 16).unwrap();
    assert_eq!(node.get_parameter("size").unwrap().as_i64(), Some(128));
    assert!(node.execute_detached(&mut CpuBackend::default()));
    let out = node.output_value("image").unwrap().unwrap().as_image().unwrap();
    assert_eq!(out.width(), 128);
    assert_eq!(out.metadata["seed"], serde_json::json!(42));
}
