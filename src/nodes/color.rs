use crate::backend::PixelKernel;
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::node::context::ProcessContext;
use crate::node::node::{NodeInfo, NodeKind};
use crate::node::parameter::{Parameter, ParameterSet};
use crate::node::port::PortSet;
use crate::nodes::image_filter_ports;

/// Colorspace tags understood by [`ColorSpaceNode`].
pub const COLORSPACES: [&str; 5] = ["RGB", "HSV", "YUV", "CMY", "GREY"];

const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

pub(crate) fn hsv_to_rgb([h, s, v]: [f32; 3]) -> [f32; 3] {
    let h = (h.rem_euclid(1.0)) * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

pub(crate) fn rgb_to_hsv([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };
    [h, s, max]
}

fn luma(rgb: [f32; 3]) -> f32 {
    rgb.iter().zip(LUMA).map(|(c, w)| c * w).sum()
}

fn rgb_to_yuv(rgb: [f32; 3]) -> [f32; 3] {
    let y = luma(rgb);
    [y, (rgb[2] - y) * 0.492 + 0.5, (rgb[0] - y) * 0.877 + 0.5]
}

fn yuv_to_rgb([y, u, v]: [f32; 3]) -> [f32; 3] {
    let r = y + (v - 0.5) / 0.877;
    let b = y + (u - 0.5) / 0.492;
    let g = (y - LUMA[0] * r - LUMA[2] * b) / LUMA[1];
    [r, g, b]
}

fn to_rgb(space: &str, px: [f32; 3]) -> [f32; 3] {
    match space {
        "HSV" => hsv_to_rgb(px),
        "YUV" => yuv_to_rgb(px),
        "CMY" => px.map(|c| 1.0 - c),
        _ => px,
    }
}

fn from_rgb(space: &str, rgb: [f32; 3]) -> [f32; 3] {
    match space {
        "HSV" => rgb_to_hsv(rgb),
        "YUV" => rgb_to_yuv(rgb),
        "CMY" => rgb.map(|c| 1.0 - c),
        "GREY" => [luma(rgb); 3],
        _ => rgb,
    }
}

/// Converts the first three channels from one colorspace to another through RGB.
#[derive(Debug)]
pub(crate) struct ColorSpaceKernel {
    pub(crate) from: String,
    pub(crate) to: String,
}

impl PixelKernel for ColorSpaceKernel {
    fn label(&self) -> &str {
        "colorspace"
    }

    fn output_colorspace(&self) -> Option<&str> {
        Some(&self.to)
    }

    fn apply(&self, _x: u32, _y: u32, px: &mut [f32]) {
        if let Some(head) = px.get_mut(..3) {
            let rgb = to_rgb(&self.from, [head[0], head[1], head[2]]);
            let out = from_rgb(&self.to, rgb).map(|c| c.clamp(0.0, 1.0));
            head.copy_from_slice(&out);
        }
    }
}

/// Converts an image between colorspaces; the result is tagged with the target space.
#[derive(Debug, Default)]
pub struct ColorSpaceNode;

impl NodeKind for ColorSpaceNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "ColorSpaceNode",
            name: "Color Space",
            category: "Color",
            description: "Convert between color spaces",
            icon: Some("palette"),
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        image_filter_ports(ports, "Converted image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::choice("target_space", "RGB", &COLORSPACES)
                .description("Target color space"),
        );
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let image = ctx.require_image("image")?.clone();
        let target = ctx.param_str("target_space")?.to_string();
        let source = image.colorspace().to_string();

        let mut out = if source == target {
            image
        } else {
            if image.channels() < 3 {
                return Err(ArtificeError::processing(format!(
                    "cannot convert a {}-channel image from {source} to {target}",
                    image.channels()
                )));
            }
            let kernel = ColorSpaceKernel {
                from: source.clone(),
                to: target,
            };
            ctx.dispatch(&kernel, &image)?
        };
        out.metadata
            .insert("source_colorspace".to_string(), serde_json::json!(source));
        ctx.set_output("image", out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/color.rs"]
mod tests;
