//! Owned per-agent view handed across the driver boundary.

use fleet_core::{AgentId, AgentStatus, Point, VertexId};

use crate::Agent;

/// Everything a presentation layer needs to draw one robot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id:             AgentId,
    pub status:         AgentStatus,
    pub position:       Point,
    pub current_vertex: VertexId,
    pub target_vertex:  Option<VertexId>,
    pub blocked_by:     Option<AgentId>,
    pub edge_progress:  f64,
}

impl From<&Agent> for AgentSnapshot {
    fn from(a: &Agent) -> Self {
        Self {
            id:             a.id(),
            status:         a.status(),
            position:       a.position(),
            current_vertex: a.current_vertex(),
            target_vertex:  a.target_vertex(),
            blocked_by:     a.blocked_by(),
            edge_progress:  a.edge_progress(),
        }
    }
}
