//! Bit-level corruption effects on the 8-bit quantised form of each sample.

use crate::backend::PixelKernel;
use crate::foundation::error::ArtificeResult;
use crate::foundation::math::{from_u8, hash_coords, to_u8};
use crate::node::context::ProcessContext;
use crate::node::node::{NodeInfo, NodeKind};
use crate::node::parameter::{Parameter, ParameterSet};
use crate::node::port::PortSet;
use crate::nodes::image_filter_ports;

fn is_alpha(channels: usize, c: usize) -> bool {
    (channels == 4 && c == 3) || (channels == 2 && c == 1)
}

fn affect_alpha_param() -> Parameter {
    Parameter::boolean("affect_alpha", false).description("Whether to affect alpha channel")
}

fn seed_param(description: &str) -> Parameter {
    Parameter::int("seed", 0)
        .range(0.0, 999_999.0)
        .description(description)
}

/// Apply `f` to every non-alpha (or every, with `affect_alpha`) byte of a pixel.
fn for_each_byte(px: &mut [f32], affect_alpha: bool, mut f: impl FnMut(usize, u8) -> u8) {
    let channels = px.len();
    for (c, v) in px.iter_mut().enumerate() {
        if !affect_alpha && is_alpha(channels, c) {
            continue;
        }
        *v = from_u8(f(c, to_u8(*v)));
    }
}

#[derive(Debug)]
pub(crate) struct BitFlipKernel {
    pub(crate) probability: f64,
    pub(crate) seed: u64,
    pub(crate) bits: u32,
    pub(crate) affect_alpha: bool,
}

impl PixelKernel for BitFlipKernel {
    fn label(&self) -> &str {
        "bit_flip"
    }

    fn apply(&self, x: u32, y: u32, px: &mut [f32]) {
        let threshold = (self.probability.clamp(0.0, 1.0) * (1u64 << 32) as f64) as u64;
        for_each_byte(px, self.affect_alpha, |c, byte| {
            let mut out = byte;
            // The `bits` most significant bits are eligible.
            for bit in (8 - self.bits.min(8))..8 {
                let roll = hash_coords(self.seed, x, y, c as u32 * 8 + bit) >> 32;
                if roll < threshold {
                    out ^= 1 << bit;
                }
            }
            out
        });
    }
}

/// Flips random bits with a per-bit probability.
#[derive(Debug, Default)]
pub struct BitFlipNode;

impl NodeKind for BitFlipNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "BitFlipNode",
            name: "Bit Flip",
            category: "Corruption",
            description: "Randomly flip bits in image data",
            icon: None,
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        image_filter_ports(ports, "Corrupted image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::float("probability", 0.01)
                .range(0.0, 1.0)
                .step(0.001)
                .description("Probability of flipping each bit"),
        );
        params.add(seed_param("Random seed for reproducibility"));
        params.add(
            Parameter::int("bits", 8)
                .range(1.0, 8.0)
                .description("Number of bits per channel to consider"),
        );
        params.add(affect_alpha_param());
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let kernel = BitFlipKernel {
            probability: ctx.param_f64("probability")?,
            seed: ctx.param_i64("seed")?.max(0) as u64,
            bits: ctx.param_i64("bits")?.clamp(1, 8) as u32,
            affect_alpha: ctx.param_bool("affect_alpha")?,
        };
        let image = ctx.require_image("image")?.clone();
        let out = ctx.dispatch(&kernel, &image)?;
        ctx.set_output("image", out)
    }
}

#[derive(Debug)]
pub(crate) struct BitShiftKernel {
    pub(crate) shift: i32,
    pub(crate) wrap: bool,
    pub(crate) affect_alpha: bool,
}

impl PixelKernel for BitShiftKernel {
    fn label(&self) -> &str {
        "bit_shift"
    }

    fn apply(&self, _x: u32, _y: u32, px: &mut [f32]) {
        let amount = self.shift.unsigned_abs().min(7);
        for_each_byte(px, self.affect_alpha, |_, byte| {
            match (self.shift >= 0, self.wrap) {
                (true, true) => byte.rotate_left(amount),
                (false, true) => byte.rotate_right(amount),
                (true, false) => byte << amount,
                (false, false) => byte >> amount,
            }
        });
    }
}

/// Shifts or rotates the bits of every sample.
#[derive(Debug, Default)]
pub struct BitShiftNode;

impl NodeKind for BitShiftNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "BitShiftNode",
            name: "Bit Shift",
            category: "Corruption",
            description: "Shift bits in image data",
            icon: None,
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        image_filter_ports(ports, "Corrupted image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::int("shift", 1)
                .range(-7.0, 7.0)
                .description("Bit shift amount (negative = right shift)"),
        );
        params.add(
            Parameter::boolean("wrap", true)
                .description("Rotate bits around instead of shifting in zeros"),
        );
        params.add(affect_alpha_param());
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let kernel = BitShiftKernel {
            shift: ctx.param_i64("shift")?.clamp(-7, 7) as i32,
            wrap: ctx.param_bool("wrap")?,
            affect_alpha: ctx.param_bool("affect_alpha")?,
        };
        let image = ctx.require_image("image")?.clone();
        let out = ctx.dispatch(&kernel, &image)?;
        ctx.set_output("image", out)
    }
}

#[derive(Debug)]
pub(crate) struct XorNoiseKernel {
    pub(crate) seed: u64,
    pub(crate) intensity: f64,
    pub(crate) affect_alpha: bool,
}

impl PixelKernel for XorNoiseKernel {
    fn label(&self) -> &str {
        "xor_noise"
    }

    fn apply(&self, x: u32, y: u32, px: &mut [f32]) {
        let intensity = self.intensity.clamp(0.0, 1.0);
        for_each_byte(px, self.affect_alpha, |c, byte| {
            let noise = (hash_coords(self.seed, x, y, c as u32) & 0xFF) as f64;
            byte ^ (noise * intensity).round() as u8
        });
    }
}

/// XORs every sample with seeded noise scaled by `intensity`.
#[derive(Debug, Default)]
pub struct XorNoiseNode;

impl NodeKind for XorNoiseNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "XorNoiseNode",
            name: "XOR Noise",
            category: "Corruption",
            description: "Apply XOR noise to image data",
            icon: None,
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        image_filter_ports(ports, "Corrupted image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(seed_param("Random seed for noise generation"));
        params.add(
            Parameter::float("intensity", 0.5)
                .range(0.0, 1.0)
                .step(0.01)
                .description("Noise intensity (0-1)"),
        );
        params.add(affect_alpha_param());
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let kernel = XorNoiseKernel {
            seed: ctx.param_i64("seed")?.max(0) as u64,
            intensity: ctx.param_f64("intensity")?,
            affect_alpha: ctx.param_bool("affect_alpha")?,
        };
        let image = ctx.require_image("image")?.clone();
        let out = ctx.dispatch(&kernel, &image)?;
        ctx.set_output("image", out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/corruption.rs"]
mod tests;
