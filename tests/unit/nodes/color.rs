use super::*;
use crate::backend::cpu::CpuBackend;
use crate::imaging::buffer::ImageBuffer;
use crate::node::node::Node;
use crate::node::value::Value;

fn close(a: [f32; 3], b: [f32; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
}

#[test]
fn hsv_round_trips_primaries() {
    for rgb in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.2, 0.4, 0.6]] {
        assert!(close(hsv_to_rgb(rgb_to_hsv(rgb)), rgb), "{rgb:?}");
    }
    assert!(close(rgb_to_hsv([0.0, 1.0, 0.0]), [1.0 / 3.0, 1.0, 1.0]));
}

#[test]
fn yuv_round_trips() {
    let rgb = [0.3, 0.7, 0.2];
    assert!(close(yuv_to_rgb(rgb_to_yuv(rgb)), rgb));
    assert!(close(rgb_to_yuv([0.5, 0.5, 0.5]), [0.5, 0.5, 0.5]));
}

fn convert(target: &str, image: ImageBuffer) -> Node {
    let mut node = Node::from_kind(ColorSpaceNode);
    node.set_parameter("target_space", target).unwrap();
    node.set_input_default("image", Some(Value::Image(image)))
        .unwrap();
    node
}

#[test]
fn node_tags_output_and_records_source() {
    let src = ImageBuffer::filled(2, 2, 3, 0.25).unwrap();
    let mut node = convert("CMY", src);
    assert!(node.execute_detached(&mut CpuBackend::default()));
    let out = node.output_value("image").unwrap().unwrap().as_image().unwrap();
    assert_eq!(out.colorspace(), "CMY");
    assert_eq!(out.pixel(1, 1).unwrap(), &[0.75, 0.75, 0.75]);
    assert_eq!(out.metadata["source_colorspace"], "RGB");
}

#[test]
fn grey_keeps_alpha() {
    let src = ImageBuffer::new(1, 1, 4, vec![1.0, 0.0, 0.0, 0.5]).unwrap();
    let mut node = convert("GREY", src);
    assert!(node.execute_detached(&mut CpuBackend::default()));
    let out = node.output_value("image").unwrap().unwrap().as_image().unwrap();
    let px = out.pixel(0, 0).unwrap();
    assert!((px[0] - 0.299).abs() < 1e-6);
    assert_eq!(px[0], px[2]);
    assert_eq!(px[3], 0.5);
}

#[test]
fn unknown_target_is_rejected_by_the_parameter() {
    let mut node = Node::from_kind(ColorSpaceNode);
    assert!(!node.set_parameter("target_space", "LAB").unwrap());
    assert_eq!(node.get_parameter("target_space").unwrap().as_str(), Some("RGB"));
}

#[test]
fn single_channel_conversion_fails() {
    let src = ImageBuffer::filled(1, 1, 1, 0.5).unwrap();
    let mut node = convert("HSV", src);
    assert!(!node.execute_detached(&mut CpuBackend::default()));
    assert!(node.last_error().unwrap().contains("1-channel"));
}
