pub(crate) mod context;
#[allow(clippy::module_inception)]
pub(crate) mod node;
pub(crate) mod parameter;
pub(crate) mod port;
pub(crate) mod value;
