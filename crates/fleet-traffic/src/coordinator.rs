//! `TrafficCoordinator`: grants or denies whole-path reservations.
//!
//! The coordinator is a plain `&mut self` structure.  Serialising requests
//! across agents is the caller's job; `fleet-sim` does it by owning the
//! coordinator on a single simulation thread.

use std::fmt;

use tracing::debug;

use fleet_core::{AgentId, EdgeKey, FleetConfig, ReleaseScope, SimTime, VertexId};

use crate::{Lease, LeaseTable, WaitingLists};

// ── PathGrant ─────────────────────────────────────────────────────────────────

/// The graph element a denied request ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contested {
    Vertex(VertexId),
    Edge(EdgeKey),
}

impl fmt::Display for Contested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contested::Vertex(v) => write!(f, "vertex {v}"),
            Contested::Edge(e) => write!(f, "edge {e}"),
        }
    }
}

/// Outcome of [`TrafficCoordinator::request`] or
/// [`TrafficCoordinator::probe`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGrant {
    /// Every element was free; for `request` they are now stamped.
    Granted,
    /// The first contested element and its live holder.
    Denied { holder: AgentId, contested: Contested },
}

impl PathGrant {
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, PathGrant::Granted)
    }

    /// Holder of the contested element, `None` when granted.
    #[inline]
    pub fn holder(&self) -> Option<AgentId> {
        match self {
            PathGrant::Granted => None,
            PathGrant::Denied { holder, .. } => Some(*holder),
        }
    }
}

/// First conflict found by a scan.
struct Conflict {
    holder:    AgentId,
    contested: Contested,
    /// Vertex whose waiting list the requester joins.
    queue_at:  VertexId,
}

// ── TrafficCoordinator ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TrafficCoordinator {
    table:          LeaseTable,
    waiting:        WaitingLists,
    lease_duration: f64,
    release_scope:  ReleaseScope,
}

impl TrafficCoordinator {
    pub fn new(lease_duration: f64, release_scope: ReleaseScope) -> Self {
        Self {
            table: LeaseTable::new(),
            waiting: WaitingLists::new(),
            lease_duration,
            release_scope,
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.lease_duration, config.release_scope)
    }

    pub fn lease_duration(&self) -> f64 {
        self.lease_duration
    }

    pub fn release_scope(&self) -> ReleaseScope {
        self.release_scope
    }

    // ── Reservation ───────────────────────────────────────────────────────

    /// Reserve `path` for `agent`, all or nothing.
    ///
    /// On denial nothing is stamped and `agent` joins the waiting list of the
    /// vertex where the scan stopped.  On grant every vertex except the last
    /// and every consecutive directed edge is stamped `(agent, now)`.  Paths
    /// shorter than two vertices are granted without stamping anything.
    pub fn request(&mut self, agent: AgentId, path: &[VertexId], now: SimTime) -> PathGrant {
        if let Some(conflict) = self.first_conflict(agent, path, now) {
            if self.waiting.push(conflict.queue_at, agent) {
                debug!(
                    agent = %agent,
                    vertex = %conflict.queue_at,
                    "added to waiting list"
                );
            }
            debug!(
                agent = %agent,
                holder = %conflict.holder,
                contested = %conflict.contested,
                "path denied"
            );
            return PathGrant::Denied { holder: conflict.holder, contested: conflict.contested };
        }

        let lease = Lease::new(agent, now);
        for pair in path.windows(2) {
            self.table.stamp_vertex(pair[0], lease);
            self.table.stamp_edge(EdgeKey::new(pair[0], pair[1]), lease);
        }
        debug!(agent = %agent, len = path.len(), "path granted");
        PathGrant::Granted
    }

    /// Same scan as [`request`](Self::request) without queueing or
    /// stamping.
    pub fn probe(&self, agent: AgentId, path: &[VertexId], now: SimTime) -> PathGrant {
        match self.first_conflict(agent, path, now) {
            Some(c) => PathGrant::Denied { holder: c.holder, contested: c.contested },
            None => PathGrant::Granted,
        }
    }

    fn first_conflict(&self, agent: AgentId, path: &[VertexId], now: SimTime) -> Option<Conflict> {
        let duration = self.lease_duration;
        for pair in path.windows(2) {
            let (here, next) = (pair[0], pair[1]);

            if let Some(lease) = self.table.vertex(here).filter(|l| l.blocks(agent, now, duration)) {
                return Some(Conflict {
                    holder:    lease.holder,
                    contested: Contested::Vertex(here),
                    queue_at:  here,
                });
            }

            let edge = EdgeKey::new(here, next);
            if let Some(lease) = self.table.edge(edge).filter(|l| l.blocks(agent, now, duration)) {
                return Some(Conflict {
                    holder:    lease.holder,
                    contested: Contested::Edge(edge),
                    queue_at:  here,
                });
            }
        }
        None
    }

    // ── Release ───────────────────────────────────────────────────────────

    /// Release `agent`'s hold on `vertex` and its edges, per the configured
    /// [`ReleaseScope`].  Returns (and clears) `vertex`'s waiting list.
    ///
    /// Releasing something not held is a no-op; the waiters are still
    /// returned.
    #[must_use = "waiters must be retried"]
    pub fn release(&mut self, agent: AgentId, vertex: VertexId) -> Vec<AgentId> {
        let freed_vertex = self.table.release_vertex(vertex, agent);
        let freed_edges = match self.release_scope {
            ReleaseScope::AllEdges => self.table.release_edges(agent, |_| true),
            ReleaseScope::IncidentEdges => self.table.release_edges(agent, |e| e.touches(vertex)),
        };
        let waiters = self.waiting.take(vertex);
        if freed_vertex || freed_edges > 0 || !waiters.is_empty() {
            debug!(
                agent = %agent,
                vertex = %vertex,
                freed_vertex,
                freed_edges,
                waiters = waiters.len(),
                "released"
            );
        }
        waiters
    }

    // ── Diagnostics ───────────────────────────────────────────────────────

    /// Agents currently queued on `vertex`, in arrival order.
    pub fn waiting(&self, vertex: VertexId) -> &[AgentId] {
        self.waiting.get(vertex)
    }

    pub fn waiting_lists(&self) -> &WaitingLists {
        &self.waiting
    }

    /// Live holder of `vertex` at `now`.
    pub fn vertex_holder(&self, vertex: VertexId, now: SimTime) -> Option<AgentId> {
        self.table
            .vertex(vertex)
            .filter(|l| l.is_live(now, self.lease_duration))
            .map(|l| l.holder)
    }

    /// Live holder of the directed edge `from -> to` at `now`.
    pub fn edge_holder(&self, from: VertexId, to: VertexId, now: SimTime) -> Option<AgentId> {
        self.table
            .edge(EdgeKey::new(from, to))
            .filter(|l| l.is_live(now, self.lease_duration))
            .map(|l| l.holder)
    }

    pub fn live_lease_count(&self, now: SimTime) -> usize {
        self.table.live_count(now, self.lease_duration)
    }

    /// Drop expired leases.  Scans already ignore them; this only bounds
    /// table growth.
    pub fn purge_expired(&mut self, now: SimTime) -> usize {
        let dropped = self.table.purge_expired(now, self.lease_duration);
        if dropped > 0 {
            debug!(dropped, "purged expired leases");
        }
        dropped
    }

    pub fn table(&self) -> &LeaseTable {
        &self.table
    }

    #[cfg(test)]
    pub(crate) fn table_mut(&mut self) -> &mut LeaseTable {
        &mut self.table
    }
}
