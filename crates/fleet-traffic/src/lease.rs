//! A single reservation record.

use fleet_core::{AgentId, SimTime};

/// `(holder, grant time)` stamped on a vertex or directed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lease {
    pub holder:     AgentId,
    pub granted_at: SimTime,
}

impl Lease {
    pub fn new(holder: AgentId, granted_at: SimTime) -> Self {
        Self { holder, granted_at }
    }

    /// `true` while `now - granted_at < duration`.
    ///
    /// A clock reading earlier than the grant counts as live.
    #[inline]
    pub fn is_live(&self, now: SimTime, duration: f64) -> bool {
        now.since(self.granted_at) < duration
    }

    /// `true` if this lease keeps `agent` out at `now`: live and held by
    /// someone else.
    #[inline]
    pub fn blocks(&self, agent: AgentId, now: SimTime, duration: f64) -> bool {
        self.holder != agent && self.is_live(now, duration)
    }
}
