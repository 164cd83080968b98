use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::foundation::core::NodeId;
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::graph::connection::Connection;

/// Deterministic dependency-count scheduler over a node/connection DAG.
///
/// Determinism rule: when multiple nodes are ready, the lexically smallest id goes first.
pub(crate) struct DagScheduler<'a> {
    indeg: BTreeMap<&'a NodeId, u32>,
    dependents: BTreeMap<&'a NodeId, Vec<&'a NodeId>>,
    ready: BinaryHeap<Reverse<&'a NodeId>>,
    remaining: usize,
}

impl<'a> DagScheduler<'a> {
    pub(crate) fn new(
        nodes: impl IntoIterator<Item = &'a NodeId>,
        connections: &'a [Connection],
    ) -> Self {
        let mut indeg = nodes
            .into_iter()
            .map(|id| (id, 0u32))
            .collect::<BTreeMap<_, _>>();
        let mut dependents = BTreeMap::<&NodeId, Vec<&NodeId>>::new();

        for c in connections {
            if !indeg.contains_key(&c.source_node) {
                continue;
            }
            if let Some(d) = indeg.get_mut(&c.dest_node) {
                *d = d.saturating_add(1);
                dependents.entry(&c.source_node).or_default().push(&c.dest_node);
            }
        }

        let ready = indeg
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| Reverse(*id))
            .collect::<BinaryHeap<_>>();

        Self {
            remaining: indeg.len(),
            indeg,
            dependents,
            ready,
        }
    }

    pub(crate) fn pop_ready(&mut self) -> Option<&'a NodeId> {
        let Reverse(id) = self.ready.pop()?;
        Some(id)
    }

    pub(crate) fn mark_done(&mut self, done: &NodeId) {
        self.remaining = self.remaining.saturating_sub(1);
        let Some(deps) = self.dependents.get(done) else {
            return;
        };
        for &dep in deps {
            if let Some(d) = self.indeg.get_mut(dep) {
                *d = d.saturating_sub(1);
                if *d == 0 {
                    self.ready.push(Reverse(dep));
                }
            }
        }
    }
}

/// Topological order of `nodes`; every source precedes its destinations.
pub(crate) fn execution_order<'a>(
    nodes: impl IntoIterator<Item = &'a NodeId>,
    connections: &'a [Connection],
) -> ArtificeResult<Vec<NodeId>> {
    let mut sched = DagScheduler::new(nodes, connections);
    let total = sched.remaining;
    let mut out = Vec::with_capacity(total);
    while let Some(next) = sched.pop_ready() {
        out.push(next.clone());
        sched.mark_done(next);
    }
    if out.len() != total {
        return Err(ArtificeError::cycle(format!(
            "{} node(s) are part of a cycle",
            total - out.len()
        )));
    }
    Ok(out)
}

/// `true` if `to` is reachable from `from` along connections (a node reaches itself).
pub(crate) fn reaches(connections: &[Connection], from: &NodeId, to: &NodeId) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if id == to {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        stack.extend(
            connections
                .iter()
                .filter(|c| &c.source_node == id)
                .map(|c| &c.dest_node),
        );
    }
    false
}

/// Every node reachable from `seeds`, seeds included.
pub(crate) fn downstream<'a>(
    connections: &'a [Connection],
    seeds: impl IntoIterator<Item = &'a NodeId>,
) -> BTreeSet<&'a NodeId> {
    let mut seen = BTreeSet::new();
    let mut stack = seeds.into_iter().collect::<Vec<_>>();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        stack.extend(
            connections
                .iter()
                .filter(|c| &c.source_node == id)
                .map(|c| &c.dest_node),
        );
    }
    seen
}

#[cfg(test)]
#[path = "../../tests/unit/graph/topology.rs"]
mod tests;
