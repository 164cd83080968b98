use super::*;

#[derive(Debug)]
struct Invert;

impl PixelKernel for Invert {
    fn label(&self) -> &str {
        "invert"
    }

    fn apply(&self, _x: u32, _y: u32, px: &mut [f32]) {
        for v in px {
            *v = 1.0 - *v;
        }
    }
}

#[derive(Debug)]
struct StampCoords;

impl PixelKernel for StampCoords {
    fn label(&self) -> &str {
        "coords"
    }

    fn output_colorspace(&self) -> Option<&str> {
        Some("XY")
    }

    fn apply(&self, x: u32, y: u32, px: &mut [f32]) {
        px[0] = x as f32;
        px[1] = y as f32;
    }
}

#[test]
fn dispatch_leaves_source_untouched() {
    let src = ImageBuffer::filled(3, 2, 3, 0.25).unwrap();
    let mut backend = CpuBackend::default();
    let out = backend.dispatch(&Invert, &src).unwrap();

    assert!(src.samples().iter().all(|v| *v == 0.25));
    assert!(out.samples().iter().all(|v| *v == 0.75));
    assert!(!out.shares_samples_with(&src));
    assert_eq!(backend.dispatch_count(), 1);
}

#[test]
fn kernel_sees_pixel_coordinates_and_can_retag() {
    let src = ImageBuffer::filled(4, 3, 2, 0.0).unwrap();
    let out = CpuBackend::default().dispatch(&StampCoords, &src).unwrap();
    assert_eq!(out.pixel(3, 2).unwrap(), &[3.0, 2.0]);
    assert_eq!(out.pixel(1, 0).unwrap(), &[1.0, 0.0]);
    assert_eq!(out.colorspace(), "XY");
}

#[test]
fn oversized_images_are_rejected() {
    let src = ImageBuffer::filled(10, 10, 1, 0.0).unwrap();
    let mut backend = CpuBackend::new(CpuBackendOpts { max_pixels: 50 });
    let err = backend.dispatch(&Invert, &src).unwrap_err();
    assert!(err.to_string().contains("exceeds the cpu backend limit"));
    assert_eq!(backend.dispatch_count(), 0);
}

#[test]
fn backend_kind_parses_case_insensitively() {
    use crate::backend::{BackendKind, create_backend};

    let kind: BackendKind = "CPU".parse().unwrap();
    assert_eq!(kind, BackendKind::Cpu);
    assert_eq!(
        create_backend(kind, &CpuBackendOpts::default()).name(),
        "cpu"
    );
    let err = "vulkan".parse::<BackendKind>().unwrap_err();
    assert!(err.to_string().contains("'vulkan' is not available"));
}
