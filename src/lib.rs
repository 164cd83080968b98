//! Artifice is a node-graph execution engine for image processing and glitch art.
//!
//! A [`NodeGraph`] holds [`Node`]s wired output-to-input by [`Connection`]s. Execution runs
//! nodes in dependency order, reuses cached outputs of clean nodes and contains per-node
//! failures in an [`ExecutionReport`]:
//!
//! - Build node instances through a [`NodeRegistry`]
//! - Wire them with [`NodeGraph::connect`] (cycles and type mismatches are rejected)
//! - Run with [`NodeGraph::execute`] and read outputs back from the nodes
//! - Persist with [`GraphDocument`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backend;
mod foundation;
mod graph;
mod imaging;
mod node;
mod nodes;
mod registry;

pub use crate::foundation::core::{NodeId, Point, PortRef};
pub use crate::foundation::error::{ArtificeError, ArtificeResult};

pub use crate::imaging::buffer::ImageBuffer;
pub use crate::imaging::codec::{
    LOAD_EXTENSIONS, SAVE_EXTENSIONS, SaveOpts, load_image, save_image,
};

pub use crate::node::context::{Detached, InputValues, ProcessContext, ValueSource};
pub use crate::node::node::{Node, NodeInfo, NodeKind};
pub use crate::node::parameter::{
    ChangeHook, ParamType, ParamValue, Parameter, ParameterDocument, ParameterSet, SetOutcome,
};
pub use crate::node::port::{InputPort, OutputPort, PortSet, check_compatible};
pub use crate::node::value::{ArrayData, PortType, Value};

pub use crate::graph::connection::Connection;
pub use crate::graph::document::{ConnectionDocument, GraphDocument, NodeDocument};
pub use crate::graph::exec::{ExecuteOpts, ExecutionReport};
pub use crate::graph::graph::NodeGraph;

pub use crate::registry::{
    NodeDescriptor, NodeFactory, NodeRegistry, NodeTypeInfo, ParameterSummary, PortSummary,
};

pub use crate::backend::cpu::{CpuBackend, CpuBackendOpts};
pub use crate::backend::{BackendKind, ComputeBackend, PixelKernel, create_backend};

pub use crate::nodes::color::{COLORSPACES, ColorSpaceNode};
pub use crate::nodes::corruption::{BitFlipNode, BitShiftNode, XorNoiseNode};
pub use crate::nodes::generator::{TestCardNode, generate_test_card};
pub use crate::nodes::io::{ImageLoaderNode, ImageSaverNode};
pub use crate::nodes::quantize::QuantizeNode;
pub use crate::nodes::utility::NullNode;
