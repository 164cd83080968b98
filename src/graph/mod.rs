pub(crate) mod connection;
pub(crate) mod document;
pub(crate) mod exec;
#[allow(clippy::module_inception)]
pub(crate) mod graph;
pub(crate) mod topology;
