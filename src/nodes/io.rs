use std::path::Path;

use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::imaging::codec::{SaveOpts, load_image, save_image};
use crate::node::context::ProcessContext;
use crate::node::node::{NodeInfo, NodeKind};
use crate::node::parameter::{Parameter, ParameterSet};
use crate::node::port::PortSet;
use crate::node::value::PortType;

const LOAD_FILTER: &str =
    "Images (*.png *.jpg *.jpeg *.tiff *.tif *.webp *.bmp *.gif);;All Files (*)";
const SAVE_FILTER: &str =
    "PNG (*.png);;JPEG (*.jpg *.jpeg);;WebP (*.webp);;TIFF (*.tiff *.tif);;BMP (*.bmp)";

/// Reads an image file into an RGB buffer.
#[derive(Debug, Default)]
pub struct ImageLoaderNode;

impl NodeKind for ImageLoaderNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "ImageLoaderNode",
            name: "Image Loader",
            category: "I/O",
            description: "Load an image file from disk",
            icon: Some("file-image"),
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        ports.add_output("image", PortType::Image, "Loaded image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::file_path("path", "")
                .description("Path to image file")
                .file_filter(LOAD_FILTER),
        );
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let path = ctx.param_str("path")?;
        if path.is_empty() {
            return Err(ArtificeError::processing("No file path specified"));
        }
        let image = load_image(Path::new(path))?;
        tracing::debug!(path, width = image.width(), height = image.height(), "loaded image");
        ctx.set_output("image", image)
    }
}

/// Writes its input image to disk; the format follows the file extension.
#[derive(Debug, Default)]
pub struct ImageSaverNode;

impl NodeKind for ImageSaverNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "ImageSaverNode",
            name: "Image Saver",
            category: "I/O",
            description: "Save an image to disk",
            icon: Some("save"),
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        ports.add_input("image", PortType::Image, "Image to save");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::file_path("path", "")
                .description("Output file path")
                .file_filter(SAVE_FILTER)
                .save_path(),
        );
        params.add(
            Parameter::int("quality", 95)
                .range(1.0, 100.0)
                .description("JPEG quality (1-100)"),
        );
        params.add(
            Parameter::int("png_compression", 6)
                .range(0.0, 9.0)
                .description("PNG compression level (0-9)"),
        );
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let path = ctx.param_str("path")?;
        if path.is_empty() {
            return Err(ArtificeError::processing("No output path specified"));
        }
        let image = ctx.require_image("image")?;
        let opts = SaveOpts {
            quality: ctx.param_i64("quality")?.clamp(1, 100) as u8,
            png_compression: ctx.param_i64("png_compression")?.clamp(0, 9) as u8,
        };
        save_image(image, Path::new(path), &opts)?;
        tracing::debug!(path, "saved image");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/io.rs"]
mod tests;
