use std::collections::BTreeMap;

use crate::foundation::core::NodeId;

/// Options for [`crate::NodeGraph::execute_with`].
#[derive(Clone, Debug, Default)]
pub struct ExecuteOpts {
    /// Mark every node dirty first, forcing a full re-run.
    pub force: bool,
    /// Stop at the first failed node; later nodes are reported as skipped and left untouched.
    pub halt_on_failure: bool,
}

/// Outcome of one graph execution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionReport {
    /// Success flag per attempted node.
    pub results: BTreeMap<NodeId, bool>,
    /// Last error of every failed node.
    pub errors: BTreeMap<NodeId, String>,
    /// Nodes that were dirty and therefore actually ran, in execution order.
    pub processed: Vec<NodeId>,
    /// Nodes not attempted because an earlier node failed under `halt_on_failure`.
    pub skipped: Vec<NodeId>,
}

impl ExecutionReport {
    pub(crate) fn record(&mut self, id: &NodeId, ran: bool, ok: bool, error: Option<&str>) {
        if ran {
            self.processed.push(id.clone());
        }
        self.results.insert(id.clone(), ok);
        if !ok {
            self.errors
                .insert(id.clone(), error.unwrap_or("unknown error").to_string());
        }
    }

    /// `true` when every attempted node succeeded and nothing was skipped.
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty() && self.skipped.is_empty()
    }

    /// Result for one node, `None` if it was not attempted.
    pub fn succeeded(&self, id: &NodeId) -> Option<bool> {
        self.results.get(id).copied()
    }

    /// Failed node ids.
    pub fn failed(&self) -> impl Iterator<Item = &NodeId> {
        self.errors.keys()
    }
}
