use crate::foundation::error::ArtificeResult;
use crate::node::context::ProcessContext;
use crate::node::node::{NodeInfo, NodeKind};
use crate::node::port::PortSet;
use crate::nodes::image_filter_ports;

/// Passes its input image through unchanged. The pixel storage is shared, not copied.
#[derive(Debug, Default)]
pub struct NullNode;

impl NodeKind for NullNode {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            type_name: "NullNode",
            name: "Null",
            category: "Utility",
            description: "Pass image through without modification",
            icon: Some("arrow-right"),
        }
    }

    fn define_ports(&self, ports: &mut PortSet) {
        image_filter_ports(ports, "Output image (unchanged)");
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()> {
        let image = ctx.require_image("image")?.clone();
        ctx.set_output("image", image)
    }
}
