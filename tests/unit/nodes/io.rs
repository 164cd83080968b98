use super::*;
use crate::backend::cpu::CpuBackend;
use crate::imaging::buffer::ImageBuffer;
use crate::node::node::Node;
use crate::node::value::Value;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "artifice_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn loader_without_path_fails_with_message() {
    let mut node = Node::from_kind(ImageLoaderNode);
    assert!(!node.execute_detached(&mut CpuBackend::default()));
    assert!(node.last_error().unwrap().contains("No file path specified"));
}

#[test]
fn loader_reports_missing_file() {
    let mut node = Node::from_kind(ImageLoaderNode);
    node.set_parameter("path", "/nonexistent/artifice/in.png")
        .unwrap();
    assert!(!node.execute_detached(&mut CpuBackend::default()));
    assert!(node.last_error().unwrap().contains("Image file not found"));
}

#[test]
fn saver_then_loader_round_trips_png() {
    let tmp = temp_dir("nodes_io_round_trip");
    let path = tmp.join("card.png");
    let samples: Vec<f32> = (0..5 * 4 * 3).map(|v| (v * 13 % 256) as f32 / 255.0).collect();
    let image = ImageBuffer::new(5, 4, 3, samples).unwrap();
    let mut backend = CpuBackend::default();

    let mut saver = Node::from_kind(ImageSaverNode);
    saver
        .set_parameter("path", path.to_string_lossy().to_string())
        .unwrap();
    saver
        .set_input_default("image", Some(Value::Image(image.clone())))
        .unwrap();
    assert!(saver.execute_detached(&mut backend), "{:?}", saver.last_error());
    assert!(path.exists());

    let mut loader = Node::from_kind(ImageLoaderNode);
    loader
        .set_parameter("path", path.to_string_lossy().to_string())
        .unwrap();
    assert!(loader.execute_detached(&mut backend));
    let loaded = loader.output_value("image").unwrap().unwrap().as_image().unwrap();
    assert_eq!(loaded.samples(), image.samples());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn saver_parameters_are_clamped() {
    let mut saver = Node::from_kind(ImageSaverNode);
    saver.set_parameter("quality", 500).unwrap();
    saver.set_parameter("png_compression", -2).unwrap();
    assert_eq!(saver.get_parameter("quality").unwrap().as_i64(), Some(100));
    assert_eq!(saver.get_parameter("png_compression").unwrap().as_i64(), Some(0));
    assert!(saver.parameter("path").unwrap().is_save_path());
}

#[test]
fn saver_rejects_unknown_extension() {
    let tmp = temp_dir("nodes_io_bad_ext");
    let mut saver = Node::from_kind(ImageSaverNode);
    saver
        .set_parameter("path", tmp.join("out.xyz").to_string_lossy().to_string())
        .unwrap();
    saver
        .set_input_default(
            "image",
            Some(Value::Image(ImageBuffer::filled(2, 2, 3, 0.5).unwrap())),
        )
        .unwrap();
    assert!(!saver.execute_detached(&mut CpuBackend::default()));
    assert!(saver.last_error().unwrap().contains("Unsupported output format"));
    std::fs::remove_dir_all(&tmp).ok();
}
