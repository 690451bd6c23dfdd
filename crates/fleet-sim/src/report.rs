//! Per-tick summary and fleet-wide snapshot.

use fleet_agent::AgentSnapshot;
use fleet_core::{AgentId, AgentStatus, SimTime, VertexId};

/// What one call to [`FleetOrchestrator::tick`][crate::FleetOrchestrator::tick]
/// did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    /// 1-based tick counter.
    pub tick:      u64,
    pub now:       SimTime,
    /// Simulated step applied to movement, after clamping.
    pub delta:     f64,
    /// MOVING agents stepped in phase 1.
    pub advanced:  usize,
    /// Vertex crossings that did not finish a task.
    pub crossed:   usize,
    /// Tasks finished this tick.
    pub completed: usize,
    /// Reservation retries attempted (waiters and periodic).
    pub retries:   usize,
    /// Retries that were granted.
    pub regranted: usize,
    /// MOVING agents after the tick.
    pub moving:    usize,
    /// BLOCKED agents after the tick.
    pub blocked:   usize,
}

/// Owned copy of every agent, ascending id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetSnapshot {
    /// Tick counter at capture time (`0` before the first tick).
    pub tick:   u64,
    /// Time of the last tick, if any.
    pub now:    Option<SimTime>,
    pub agents: Vec<AgentSnapshot>,
}

impl FleetSnapshot {
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.agents
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|i| &self.agents[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentSnapshot> {
        self.agents.iter()
    }

    /// Number of agents in `status`.
    pub fn count(&self, status: AgentStatus) -> usize {
        self.agents.iter().filter(|a| a.status == status).count()
    }

    /// Agents standing on `vertex`, ascending id.
    pub fn agents_at(&self, vertex: VertexId) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|a| a.current_vertex == vertex)
            .map(|a| a.id)
            .collect()
    }
}
