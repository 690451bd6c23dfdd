//! `WaitingLists`: agents denied through a vertex, handed back on release.
//!
//! Entries are advisory.  Nothing guarantees an agent on a list is still
//! blocked when the list is drained; the caller re-checks status.

use std::collections::BTreeMap;

use fleet_core::{AgentId, VertexId};

/// Per-vertex ordered, deduplicated lists of agent ids.
#[derive(Debug, Clone, Default)]
pub struct WaitingLists {
    inner: BTreeMap<VertexId, Vec<AgentId>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl WaitingLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `agent` to `vertex`'s list unless already present.
    /// Returns `true` if it was appended.
    pub fn push(&mut self, vertex: VertexId, agent: AgentId) -> bool {
        let list = self.inner.entry(vertex).or_default();
        if list.contains(&agent) {
            return false;
        }
        list.push(agent);
        self.total += 1;
        true
    }

    /// Remove and return the list for `vertex` (empty if none).
    pub fn take(&mut self, vertex: VertexId) -> Vec<AgentId> {
        let agents = self.inner.remove(&vertex).unwrap_or_default();
        self.total -= agents.len();
        agents
    }

    /// Current list for `vertex`, in insertion order.
    pub fn get(&self, vertex: VertexId) -> &[AgentId] {
        self.inner.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of (vertex, agent) entries.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Vertices that currently have at least one waiter, ascending.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.inner.keys().copied()
    }
}
