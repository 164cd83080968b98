use super::*;
use crate::backend::ComputeBackend;
use crate::backend::cpu::CpuBackend;
use crate::node::node::Node;
use crate::node::value::Value;

#[test]
fn two_levels_threshold_at_half() {
    let src = ImageBuffer::new(4, 1, 1, vec![0.1, 0.4, 0.6, 0.9]).unwrap();
    let kernel = QuantizeKernel::new(&src, QuantizeMode::Uniform, 2, None);
    let out = CpuBackend::default().dispatch(&kernel, &src).unwrap();
    assert_eq!(out.samples(), &[0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn adaptive_uses_image_range() {
    let src = ImageBuffer::new(3, 1, 1, vec![0.2, 0.31, 0.4]).unwrap();
    let kernel = QuantizeKernel::new(&src, QuantizeMode::Adaptive, 3, None);
    assert_eq!(kernel.ranges, vec![(0.2, 0.4)]);
    let out = CpuBackend::default().dispatch(&kernel, &src).unwrap();
    let s = out.samples();
    assert!((s[0] - 0.2).abs() < 1e-6);
    assert!((s[1] - 0.3).abs() < 1e-6);
    assert!((s[2] - 0.4).abs() < 1e-6);
}

#[test]
fn per_channel_ranges_are_independent() {
    let src = ImageBuffer::new(2, 1, 2, vec![0.0, 0.5, 1.0, 0.5]).unwrap();
    let kernel = QuantizeKernel::new(&src, QuantizeMode::PerChannel, 4, None);
    assert_eq!(kernel.ranges, vec![(0.0, 1.0), (0.5, 0.5)]);
    let out = CpuBackend::default().dispatch(&kernel, &src).unwrap();
    assert_eq!(out.samples(), src.samples());
}

#[test]
fn dithering_varies_with_position() {
    let src = ImageBuffer::filled(4, 4, 1, 0.5).unwrap();
    let kernel = QuantizeKernel::new(&src, QuantizeMode::Uniform, 2, Some(1.0));
    let out = CpuBackend::default().dispatch(&kernel, &src).unwrap();
    let ones = out.samples().iter().filter(|v| **v == 1.0).count();
    assert!(ones > 0 && ones < 16, "{ones}");
}

#[test]
fn node_reads_parameters() {
    let mut node = Node::from_kind(QuantizeNode);
    node.set_parameter("levels", 2).unwrap();
    node.set_input_default(
        "image",
        Some(Value::Image(ImageBuffer::new(2, 1, 1, vec![0.2, 0.8]).unwrap())),
    )
    .unwrap();
    assert!(node.execute_detached(&mut CpuBackend::default()));
    let out = node.output_value("image").unwrap().unwrap().as_image().unwrap();
    assert_eq!(out.samples(), &[0.0, 1.0]);
}
