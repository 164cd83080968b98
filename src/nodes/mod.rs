//! Built-in node kinds.

pub(crate) mod color;
pub(crate) mod corruption;
pub(crate) mod generator;
pub(crate) mod io;
pub(crate) mod quantize;
pub(crate) mod utility;

use crate::node::port::PortSet;
use crate::node::value::PortType;
use crate::registry::NodeRegistry;

/// Register every built-in kind, plus the `PassThroughNode` alias of `NullNode`.
pub(crate) fn register_builtin(registry: &mut NodeRegistry) {
    registry.register::<io::ImageLoaderNode>();
    registry.register::<io::ImageSaverNode>();
    registry.register::<utility::NullNode>();
    registry.register::<generator::TestCardNode>();
    registry.register::<color::ColorSpaceNode>();
    registry.register::<corruption::BitFlipNode>();
    registry.register::<corruption::BitShiftNode>();
    registry.register::<corruption::XorNoiseNode>();
    registry.register::<quantize::QuantizeNode>();
    if let Err(err) = registry.register_alias("PassThroughNode", "NullNode") {
        tracing::warn!(%err, "failed to register PassThroughNode alias");
    }
}

/// One required IMAGE input and one IMAGE output, both named `image`.
pub(crate) fn image_filter_ports(ports: &mut PortSet, output_description: &str) {
    ports.add_input("image", PortType::Image, "Input image");
    ports.add_output("image", PortType::Image, output_description);
}
