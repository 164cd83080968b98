use super::*;
use crate::backend::ComputeBackend;
use crate::backend::cpu::CpuBackend;
use crate::imaging::buffer::ImageBuffer;
use crate::node::node::Node;
use crate::node::value::Value;

fn bytes_image(channels: u8, bytes: &[u8]) -> ImageBuffer {
    let samples = bytes.iter().map(|b| from_u8(*b)).collect::<Vec<_>>();
    let width = (bytes.len() / usize::from(channels)) as u32;
    ImageBuffer::new(width, 1, channels, samples).unwrap()
}

fn bytes_of(image: &ImageBuffer) -> Vec<u8> {
    image.samples().iter().map(|v| to_u8(*v)).collect()
}

#[test]
fn certain_flip_inverts_colour_bytes_but_not_alpha() {
    let kernel = BitFlipKernel {
        probability: 1.0,
        seed: 3,
        bits: 8,
        affect_alpha: false,
    };
    let src = bytes_image(4, &[0, 0x0F, 0xF0, 200]);
    let out = CpuBackend::default().dispatch(&kernel, &src).unwrap();
    assert_eq!(bytes_of(&out), vec![0xFF, 0xF0, 0x0F, 200]);
}

#[test]
fn flip_restricted_to_high_bits() {
    let kernel = BitFlipKernel {
        probability: 1.0,
        seed: 0,
        bits: 2,
        affect_alpha: false,
    };
    let out = CpuBackend::default()
        .dispatch(&kernel, &bytes_image(1, &[0x00]))
        .unwrap();
    assert_eq!(bytes_of(&out), vec![0xC0]);
}

#[test]
fn zero_probability_is_identity() {
    let kernel = BitFlipKernel {
        probability: 0.0,
        seed: 9,
        bits: 8,
        affect_alpha: true,
    };
    let src = bytes_image(3, &[1, 2, 3, 250, 251, 252]);
    let out = CpuBackend::default().dispatch(&kernel, &src).unwrap();
    assert_eq!(bytes_of(&out), bytes_of(&src));
}

#[test]
fn shift_wraps_or_drops_bits() {
    let src = bytes_image(1, &[0b1000_0001]);
    let mut backend = CpuBackend::default();

    let rotate = BitShiftKernel {
        shift: 1,
        wrap: true,
        affect_alpha: false,
    };
    assert_eq!(
        bytes_of(&backend.dispatch(&rotate, &src).unwrap()),
        vec![0b0000_0011]
    );

    let shift_right = BitShiftKernel {
        shift: -1,
        wrap: false,
        affect_alpha: false,
    };
    assert_eq!(
        bytes_of(&backend.dispatch(&shift_right, &src).unwrap()),
        vec![0b0100_0000]
    );
}

#[test]
fn xor_noise_is_seeded_and_scaled() {
    let src = bytes_image(3, &[10, 20, 30, 40, 50, 60]);
    let mut backend = CpuBackend::default();
    let kernel = |seed, intensity| XorNoiseKernel {
        seed,
        intensity,
        affect_alpha: false,
    };

    let none = backend.dispatch(&kernel(1, 0.0), &src).unwrap();
    assert_eq!(bytes_of(&none), bytes_of(&src));

    let a = backend.dispatch(&kernel(1, 1.0), &src).unwrap();
    let b = backend.dispatch(&kernel(1, 1.0), &src).unwrap();
    let c = backend.dispatch(&kernel(2, 1.0), &src).unwrap();
    assert_eq!(a, b);
    assert_ne!(bytes_of(&a), bytes_of(&c));
}

#[test]
fn nodes_dispatch_through_backend() {
    let mut backend = CpuBackend::default();
    let mut node = Node::from_kind(BitShiftNode);
    node.set_input_default("image", Some(Value::Image(bytes_image(1, &[1]))))
        .unwrap();
    node.set_parameter("shift", 3).unwrap();

    assert!(node.execute_detached(&mut backend));
    assert_eq!(backend.dispatch_count(), 1);
    let out = node.output_value("image").unwrap().unwrap().as_image().unwrap();
    assert_eq!(bytes_of(out), vec![8]);
}

#[test]
fn missing_image_is_a_processing_error() {
    let mut node = Node::from_kind(XorNoiseNode);
    node.ports_mut().input_mut("image").unwrap().optional();
    assert!(!node.execute_detached(&mut CpuBackend::default()));
    assert_eq!(
        node.last_error(),
        Some("processing failure: No input image")
    );
}
