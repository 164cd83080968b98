use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::foundation::math::to_u8;

/// Image payload carried by IMAGE ports.
///
/// Samples are `f32` in `[0, 1]`, stored row-major and channel-interleaved (HWC). The sample
/// storage is shared behind an [`Arc`], so passing a buffer along a connection never copies
/// pixels; writers go through [`ImageBuffer::samples_mut`], which clones on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    channels: u8,
    colorspace: String,
    samples: Arc<Vec<f32>>,
    /// Free-form metadata (source path, original size, conversion history).
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ImageBuffer {
    /// Build a buffer from interleaved samples, validating the sample count.
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<f32>) -> ArtificeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ArtificeError::processing("image width/height must be > 0"));
        }
        if !(1..=4).contains(&channels) {
            return Err(ArtificeError::processing(format!(
                "image channel count must be 1..=4, got {channels}"
            )));
        }
        let expected = width as usize * height as usize * usize::from(channels);
        if samples.len() != expected {
            return Err(ArtificeError::processing(format!(
                "image sample count mismatch: expected {expected}, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            colorspace: "RGB".to_string(),
            samples: Arc::new(samples),
            metadata: BTreeMap::new(),
        })
    }

    /// Build a buffer with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: f32) -> ArtificeResult<Self> {
        let len = width as usize * height as usize * usize::from(channels);
        Self::new(width, height, channels, vec![value; len])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Colorspace tag, `"RGB"` unless a conversion node changed it.
    pub fn colorspace(&self) -> &str {
        &self.colorspace
    }

    /// Replace the colorspace tag.
    pub fn with_colorspace(mut self, colorspace: impl Into<String>) -> Self {
        self.colorspace = colorspace.into();
        self
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable samples; clones the storage if it is shared.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        Arc::make_mut(&mut self.samples).as_mut_slice()
    }

    /// `true` when both buffers point at the same sample storage.
    pub fn shares_samples_with(&self, other: &ImageBuffer) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }

    /// Samples of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = usize::from(self.channels);
        let start = (y as usize * self.width as usize + x as usize) * c;
        self.samples.get(start..start + c)
    }

    /// Convert to an 8-bit `image` buffer (Luma, LumaA, Rgb or Rgba by channel count).
    pub fn to_dynamic_image(&self) -> ArtificeResult<image::DynamicImage> {
        let bytes: Vec<u8> = self.samples.iter().map(|&v| to_u8(v)).collect();
        let (w, h) = (self.width, self.height);
        let img = match self.channels {
            1 => image::GrayImage::from_raw(w, h, bytes).map(image::DynamicImage::ImageLuma8),
            2 => image::GrayAlphaImage::from_raw(w, h, bytes)
                .map(image::DynamicImage::ImageLumaA8),
            3 => image::RgbImage::from_raw(w, h, bytes).map(image::DynamicImage::ImageRgb8),
            _ => image::RgbaImage::from_raw(w, h, bytes).map(image::DynamicImage::ImageRgba8),
        };
        img.ok_or_else(|| ArtificeError::processing("image buffer does not match its dimensions"))
    }

    /// Build a 3-channel buffer from an `f32` RGB image.
    pub fn from_rgb32f(img: image::Rgb32FImage) -> ArtificeResult<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, 3, img.into_raw())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/buffer.rs"]
mod tests;
