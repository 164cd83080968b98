use crate::foundation::error::ArtificeResult;
use crate::foundation::math::{hash_coords, mix64};
use crate::imaging::buffer::ImageBuffer;
use crate::node::context::ProcessContext;
use crate::node::node::{NodeInfo, NodeKind};
use crate::node::parameter::{Parameter, ParameterSet};
use crate::node::port::PortSet;
use crate::node::value::PortType;
use crate::nodes::color::hsv_to_rgb;

const NOISE_BLOCK: u32 = 8;

/// Square RGB calibration card in four horizontal bands: hue sweep, grey ramp,
/// checkerboard and seeded block noise.
pub fn generate_test_card(size: u32, seed: u64) -> ArtificeResult<ImageBuffer> {
    let band = (size / 4).max(1);
    let cell = (size / 16).max(1);
    let denom = (size.max(2) - 1) as f32;
    let mut samples = Vec::with_capacity(size as usize * size as usize * 3);

    for y in 0..size {
        for x in 0..size {
            let t = x as f32 / denom;
            let rgb = match y / band {
                0 => hsv_to_rgb([t, 1.0, 1.0]),
                1 => [t, t, t],
                2 => {
                    let v = if ((x / cell) + (y / cell)) % 2 == 0 { 1.0 } else { 0.0 };
                    [v, v, v]
                }
                _ => {
                    let (bx, by) = (x / NOISE_BLOCK, y / NOISE_BLOCK);
                    [0u32, 1, 2].map(|c| (hash_coords(seed, bx, by, c) & 0xFF) as f32 / 255.0)
                }
            };
            samples.extend_from_slice(&rgb);
        }
    }

    let mut card = ImageBuffer::new(size, size, 3, samples)?;
    card.metadata
        .insert("generator".to_string(), serde_json::json!("test_card"));
    card.metadata
        .insert("seed".to_string(), serde_json::json!(seed));
    Ok(card)
}

/// Procedural test card for calibrating effects.
#[derive(Debug, Default)]
pub struct TestCardNode;

impl NodeKind for TestCardNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "TestCardNode",
            name: "Test Card",
            category: "Generator",
            description: "Generate a procedural test card for calibration",
            icon: Some("grid"),
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        ports.add_output("image", PortType::Image, "Generated test card image");
    }

    fn define_parameters(&self, params: &mut ParameterSet) {
        params.add(
            Parameter::int("size", 512)
                .range(128.0, 2048.0)
                .step(128.0)
                .description("Output image size (square)"),
        );
        params.add(
            Parameter::int("seed", 42)
                .range(0.0, 999_999.0)
                .description("Random seed for reproducible patterns"),
        );
        params.add(
            Parameter::boolean("use_seed", true)
                .description("Use fixed seed (disable for random each time)"),
        );
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let size = ctx.param_i64("size")?.clamp(1, 2048) as u32;
        let seed = if ctx.param_bool("use_seed")? {
            ctx.param_i64("seed")?.max(0) as u64
        } else {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            mix64(nanos)
        };
        ctx.set_output("image", generate_test_card(size, seed)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/generator.rs"]
mod tests;
