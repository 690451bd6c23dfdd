//! `LeaseTable`: current vertex and edge reservations.
//!
//! The table is a dumb store: it does not know the lease duration's policy
//! beyond the helpers that take it as a parameter, and it never checks
//! ownership on insert.  [`TrafficCoordinator`](crate::TrafficCoordinator)
//! enforces the protocol.

use fleet_core::{AgentId, EdgeKey, SimTime, VertexId};

use crate::Lease;

#[cfg(feature = "fx-hash")]
type LeaseMap<K> = rustc_hash::FxHashMap<K, Lease>;
#[cfg(not(feature = "fx-hash"))]
type LeaseMap<K> = std::collections::HashMap<K, Lease>;

#[derive(Debug, Clone, Default)]
pub struct LeaseTable {
    vertices: LeaseMap<VertexId>,
    edges:    LeaseMap<EdgeKey>,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Stored lease on `v`, live or not.
    #[inline]
    pub fn vertex(&self, v: VertexId) -> Option<&Lease> {
        self.vertices.get(&v)
    }

    /// Stored lease on the directed edge, live or not.
    #[inline]
    pub fn edge(&self, e: EdgeKey) -> Option<&Lease> {
        self.edges.get(&e)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Overwrite whatever is stored on `v`.
    pub fn stamp_vertex(&mut self, v: VertexId, lease: Lease) {
        self.vertices.insert(v, lease);
    }

    /// Overwrite whatever is stored on `e`.
    pub fn stamp_edge(&mut self, e: EdgeKey, lease: Lease) {
        self.edges.insert(e, lease);
    }

    /// Remove the lease on `v` iff `agent` holds it.  Returns whether a lease
    /// was removed.
    pub fn release_vertex(&mut self, v: VertexId, agent: AgentId) -> bool {
        match self.vertices.get(&v) {
            Some(lease) if lease.holder == agent => {
                self.vertices.remove(&v);
                true
            }
            _ => false,
        }
    }

    /// Remove every edge lease held by `agent` for which `select` returns
    /// `true`.  Returns the number removed.
    pub fn release_edges(&mut self, agent: AgentId, select: impl Fn(EdgeKey) -> bool) -> usize {
        let before = self.edges.len();
        self.edges.retain(|&e, lease| !(lease.holder == agent && select(e)));
        before - self.edges.len()
    }

    /// Drop every lease that is no longer live.  Returns the number dropped.
    pub fn purge_expired(&mut self, now: SimTime, duration: f64) -> usize {
        let before = self.len();
        self.vertices.retain(|_, l| l.is_live(now, duration));
        self.edges.retain(|_, l| l.is_live(now, duration));
        before - self.len()
    }

    // ── Counts ────────────────────────────────────────────────────────────

    /// Number of stored leases (live or expired).
    pub fn len(&self) -> usize {
        self.vertices.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Number of leases still live at `now`.
    pub fn live_count(&self, now: SimTime, duration: f64) -> usize {
        self.vertices.values().filter(|l| l.is_live(now, duration)).count()
            + self.edges.values().filter(|l| l.is_live(now, duration)).count()
    }

    /// Every stored vertex lease, unordered.
    pub fn vertex_leases(&self) -> impl Iterator<Item = (VertexId, &Lease)> + '_ {
        self.vertices.iter().map(|(&v, l)| (v, l))
    }

    /// Every stored edge lease, unordered.
    pub fn edge_leases(&self) -> impl Iterator<Item = (EdgeKey, &Lease)> + '_ {
        self.edges.iter().map(|(&e, l)| (e, l))
    }
}
