use crate::backend::PixelKernel;
use crate::foundation::error::ArtificeResult;
use crate::imaging::buffer::ImageBuffer;
use crate::node::context::ProcessContext;
use crate::node::node::{NodeInfo, NodeKind};
use crate::node::parameter::{Parameter, ParameterSet};
use crate::node::port::PortSet;
use crate::nodes::image_filter_ports;

const BAYER_4X4: [[f32; 4]; 4] = [
    [0.0, 8.0, 2.0, 10.0],
    [12.0, 4.0, 14.0, 6.0],
    [3.0, 11.0, 1.0, 9.0],
    [15.0, 7.0, 13.0, 5.0],
];

/// How quantisation bounds are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QuantizeMode {
    /// Fixed `[0, 1]` range.
    Uniform,
    /// Image-wide min/max.
    Adaptive,
    /// Min/max per channel.
    PerChannel,
}

impl QuantizeMode {
    fn parse(s: &str) -> Self {
        match s {
            "adaptive" => QuantizeMode::Adaptive,
            "per_channel" => QuantizeMode::PerChannel,
            _ => QuantizeMode::Uniform,
        }
    }
}

#[derive(Debug)]
pub(crate) struct QuantizeKernel {
    pub(crate) levels: u32,
    pub(crate) dither: Option<f32>,
    /// `(min, max)` per channel.
    pub(crate) ranges: Vec<(f32, f32)>,
}

impl QuantizeKernel {
    pub(crate) fn new(
        image: &ImageBuffer,
        mode: QuantizeMode,
        levels: u32,
        dither: Option<f32>,
    ) -> Self {
        let channels = usize::from(image.channels());
        let mut ranges = vec![(0.0f32, 1.0f32); channels];
        if mode != QuantizeMode::Uniform {
            let mut mins = vec![f32::INFINITY; channels];
            let mut maxs = vec![f32::NEG_INFINITY; channels];
            for px in image.samples().chunks_exact(channels) {
                for (c, v) in px.iter().enumerate() {
                    mins[c] = mins[c].min(*v);
                    maxs[c] = maxs[c].max(*v);
                }
            }
            if mode == QuantizeMode::Adaptive {
                let lo = mins.iter().copied().fold(f32::INFINITY, f32::min);
                let hi = maxs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                ranges.fill((lo, hi));
            } else {
                ranges = mins.into_iter().zip(maxs).collect();
            }
        }
        Self {
            levels: levels.max(2),
            dither,
            ranges,
        }
    }
}

impl PixelKernel for QuantizeKernel {
    fn label(&self) -> &str {
        "quantize"
    }

    fn apply(&self, x: u32, y: u32, px: &mut [f32]) {
        let steps = (self.levels - 1) as f32;
        let offset = self.dither.map_or(0.0, |strength| {
            let threshold = BAYER_4X4[(y % 4) as usize][(x % 4) as usize];
            ((threshold + 0.5) / 16.0 - 0.5) * strength / steps
        });
        for (v, &(lo, hi)) in px.iter_mut().zip(&self.ranges) {
            let span = hi - lo;
            if span <= f32::EPSILON {
                continue;
            }
            let t = ((*v - lo) / span + offset).clamp(0.0, 1.0);
            *v = lo + (t * steps).round() / steps * span;
        }
    }
}

/// Reduces every channel to a fixed number of levels, optionally with ordered dithering.
#[derive(Debug, Default)]
pub struct QuantizeNode;

impl NodeKind for QuantizeNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "QuantizeNode",
            name: "Quantize",
            category: "Quantization",
            description: "Reduce color precision",
            icon: None,
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        image_filter_ports(ports, "Quantized image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::int("levels", 8)
                .range(2.0, 256.0)
                .description("Number of quantization levels"),
        );
        params.add(
            Parameter::choice("mode", "uniform", &["uniform", "adaptive", "per_channel"])
                .description("Quantization mode"),
        );
        params.add(Parameter::boolean("dither", false).description("Apply ordered dithering"));
        params.add(
            Parameter::float("dither_strength", 1.0)
                .range(0.0, 2.0)
                .description("Dithering strength"),
        );
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let levels = ctx.param_i64("levels")?.clamp(2, 256) as u32;
        let mode = QuantizeMode::parse(ctx.param_str("mode")?);
        let dither = if ctx.param_bool("dither")? {
            Some(ctx.param_f64("dither_strength")? as f32)
        } else {
            None
        };
        let image = ctx.require_image("image")?.clone();
        let kernel = QuantizeKernel::new(&image, mode, levels, dither);
        let out = ctx.dispatch(&kernel, &image)?;
        ctx.set_output("image", out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/quantize.rs"]
mod tests;
