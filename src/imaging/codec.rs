use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use image::codecs::{
    jpeg::JpegEncoder,
    png::{CompressionType, FilterType, PngEncoder},
    webp::WebPEncoder,
};

use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::imaging::buffer::ImageBuffer;

/// File extensions accepted by [`load_image`] (lowercase, without the dot).
pub const LOAD_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "tiff", "tif", "webp", "bmp", "gif"];

/// File extensions accepted by [`save_image`] (lowercase, without the dot).
pub const SAVE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "tiff", "tif", "webp", "bmp"];

/// Encoder settings for [`save_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOpts {
    /// JPEG quality, `1..=100`. WebP output is always lossless.
    pub quality: u8,
    /// PNG compression effort, `0..=9`.
    pub png_compression: u8,
}

impl Default for SaveOpts {
    fn default() -> Self {
        Self {
            quality: 95,
            png_compression: 6,
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Load an image file into a 3-channel RGB buffer.
///
/// Images with alpha are composited onto white; greyscale is expanded to RGB. The buffer
/// records `source_path` and `original_size` in its metadata.
pub fn load_image(path: &Path) -> ArtificeResult<ImageBuffer> {
    if !path.exists() {
        return Err(ArtificeError::processing(format!(
            "Image file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(ArtificeError::processing(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }
    let ext = extension_of(path);
    if !LOAD_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ArtificeError::processing(format!(
            "Unsupported image format: .{ext}. Supported: {}",
            LOAD_EXTENSIONS.join(", ")
        )));
    }

    let decoded = image::ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff image format '{}'", path.display()))?
        .decode()
        .with_context(|| format!("decode image '{}'", path.display()))?;
    let (width, height) = (decoded.width(), decoded.height());

    let rgb = if decoded.color().has_alpha() {
        let rgba = decoded.to_rgba32f();
        let mut out = Vec::with_capacity(width as usize * height as usize * 3);
        for px in rgba.pixels() {
            let a = px.0[3];
            for c in &px.0[..3] {
                out.push(c * a + (1.0 - a));
            }
        }
        ImageBuffer::new(width, height, 3, out)?
    } else {
        ImageBuffer::from_rgb32f(decoded.to_rgb32f())?
    };

    let mut rgb = rgb.with_colorspace("RGB");
    rgb.metadata.insert(
        "source_path".to_string(),
        serde_json::Value::String(path.display().to_string()),
    );
    rgb.metadata.insert(
        "original_size".to_string(),
        serde_json::json!([width, height]),
    );
    Ok(rgb)
}

/// Save a buffer to disk; the format is chosen by the file extension.
///
/// Missing parent directories are created.
pub fn save_image(buffer: &ImageBuffer, path: &Path, opts: &SaveOpts) -> ArtificeResult<()> {
    let ext = extension_of(path);
    if !SAVE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ArtificeError::processing(format!(
            "Unsupported output format: .{ext}. Supported: {}",
            SAVE_EXTENSIONS.join(", ")
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let img = buffer.to_dynamic_image()?;
    match ext.as_str() {
        "png" => {
            let compression = match opts.png_compression {
                0..=3 => CompressionType::Fast,
                4..=6 => CompressionType::Default,
                _ => CompressionType::Best,
            };
            let w = create_writer(path)?;
            img.write_with_encoder(PngEncoder::new_with_quality(
                w,
                compression,
                FilterType::Adaptive,
            ))
            .with_context(|| format!("write png '{}'", path.display()))?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel.
            let img = if img.color().has_alpha() {
                image::DynamicImage::ImageRgb8(img.to_rgb8())
            } else {
                img
            };
            let mut w = create_writer(path)?;
            img.write_with_encoder(JpegEncoder::new_with_quality(
                &mut w,
                opts.quality.clamp(1, 100),
            ))
            .with_context(|| format!("write jpeg '{}'", path.display()))?;
        }
        "webp" => {
            let img = match img {
                image::DynamicImage::ImageRgb8(_) | image::DynamicImage::ImageRgba8(_) => img,
                other => image::DynamicImage::ImageRgba8(other.to_rgba8()),
            };
            let w = create_writer(path)?;
            img.write_with_encoder(WebPEncoder::new_lossless(w))
                .with_context(|| format!("write webp '{}'", path.display()))?;
        }
        "tiff" | "tif" => {
            img.save_with_format(path, image::ImageFormat::Tiff)
                .with_context(|| format!("write tiff '{}'", path.display()))?;
        }
        _ => {
            img.save_with_format(path, image::ImageFormat::Bmp)
                .with_context(|| format!("write bmp '{}'", path.display()))?;
        }
    }
    Ok(())
}

fn create_writer(path: &Path) -> ArtificeResult<BufWriter<File>> {
    let f = File::create(path)
        .map_err(|e| ArtificeError::io(format!("create '{}': {e}", path.display())))?;
    Ok(BufWriter::new(f))
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/codec.rs"]
mod tests;
