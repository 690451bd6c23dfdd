//! Plain data rows written by output backends.

use fleet_agent::AgentSnapshot;
use fleet_core::AgentStatus;
use fleet_sim::TickReport;

/// Stands in for an absent vertex or agent id.
pub const NONE: u32 = u32::MAX;

/// One agent at one snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:      u32,
    pub tick:          u64,
    pub sim_time:      f64,
    pub status:        AgentStatus,
    pub vertex:        u32,
    /// [`NONE`] when the agent has no task.
    pub target:        u32,
    /// [`NONE`] unless BLOCKED.
    pub blocked_by:    u32,
    pub x:             f64,
    pub y:             f64,
    pub edge_progress: f64,
}

impl AgentSnapshotRow {
    pub fn new(tick: u64, sim_time: f64, agent: &AgentSnapshot) -> Self {
        Self {
            agent_id:      agent.id.0,
            tick,
            sim_time,
            status:        agent.status,
            vertex:        agent.current_vertex.0,
            target:        agent.target_vertex.map_or(NONE, |v| v.0),
            blocked_by:    agent.blocked_by.map_or(NONE, |a| a.0),
            x:             agent.position.x,
            y:             agent.position.y,
            edge_progress: agent.edge_progress,
        }
    }
}

/// Counters for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:      u64,
    pub sim_time:  f64,
    pub delta:     f64,
    pub moving:    u64,
    pub blocked:   u64,
    pub crossed:   u64,
    pub completed: u64,
    pub retries:   u64,
    pub regranted: u64,
}

impl From<&TickReport> for TickSummaryRow {
    fn from(r: &TickReport) -> Self {
        Self {
            tick:      r.tick,
            sim_time:  r.now.0,
            delta:     r.delta,
            moving:    r.moving as u64,
            blocked:   r.blocked as u64,
            crossed:   r.crossed as u64,
            completed: r.completed as u64,
            retries:   r.retries as u64,
            regranted: r.regranted as u64,
        }
    }
}
