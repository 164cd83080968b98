use super::*;

#[test]
fn new_validates_dimensions_and_sample_count() {
    assert!(ImageBuffer::new(0, 1, 3, vec![]).is_err());
    assert!(ImageBuffer::new(1, 1, 5, vec![0.0; 5]).is_err());
    assert!(ImageBuffer::new(2, 2, 3, vec![0.0; 11]).is_err());
    let buf = ImageBuffer::new(2, 2, 3, vec![0.0; 12]).unwrap();
    assert_eq!(buf.colorspace(), "RGB");
}

#[test]
fn clones_share_samples_until_written() {
    let a = ImageBuffer::filled(4, 4, 3, 0.5).unwrap();
    let mut b = a.clone();
    assert!(a.shares_samples_with(&b));
    b.samples_mut()[0] = 1.0;
    assert!(!a.shares_samples_with(&b));
    assert_eq!(a.samples()[0], 0.5);
}

#[test]
fn pixel_reads_interleaved_samples() {
    let samples = (0..12).map(|v| v as f32 / 12.0).collect();
    let buf = ImageBuffer::new(2, 2, 3, samples).unwrap();
    assert_eq!(buf.pixel(1, 1).unwrap(), &buf.samples()[9..12]);
    assert_eq!(buf.pixel(2, 0), None);
    assert_eq!(buf.pixel(0, 2), None);
    assert_eq!(buf.pixel(u32::MAX, u32::MAX), None);
}

#[test]
fn dynamic_image_matches_channel_count() {
    let grey = ImageBuffer::filled(3, 2, 1, 1.0).unwrap();
    let img = grey.to_dynamic_image().unwrap();
    assert!(matches!(img, image::DynamicImage::ImageLuma8(_)));
    assert_eq!(img.width(), 3);

    let rgb = ImageBuffer::filled(3, 2, 3, 0.0).unwrap();
    assert!(matches!(
        rgb.to_dynamic_image().unwrap(),
        image::DynamicImage::ImageRgb8(_)
    ));
}
