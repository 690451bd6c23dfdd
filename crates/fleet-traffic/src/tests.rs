//! Unit and property tests for fleet-traffic.

#[cfg(test)]
mod helpers {
    use fleet_core::VertexId;

    /// `[v(a), v(a+1), …]` from plain integers.
    pub fn path(ids: &[u32]) -> Vec<VertexId> {
        ids.iter().copied().map(VertexId).collect()
    }
}

// ── Lease ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lease {
    use fleet_core::{AgentId, SimTime};
    use crate::Lease;

    #[test]
    fn live_until_duration_elapses() {
        let l = Lease::new(AgentId(1), SimTime(10.0));
        assert!(l.is_live(SimTime(10.0), 5.0));
        assert!(l.is_live(SimTime(14.999), 5.0));
        assert!(!l.is_live(SimTime(15.0), 5.0));
        assert!(!l.is_live(SimTime(100.0), 5.0));
    }

    #[test]
    fn earlier_clock_counts_as_live() {
        let l = Lease::new(AgentId(1), SimTime(10.0));
        assert!(l.is_live(SimTime(9.0), 5.0));
    }

    #[test]
    fn holder_is_never_blocked_by_own_lease() {
        let l = Lease::new(AgentId(1), SimTime::ZERO);
        assert!(!l.blocks(AgentId(1), SimTime(1.0), 5.0));
        assert!(l.blocks(AgentId(2), SimTime(1.0), 5.0));
        assert!(!l.blocks(AgentId(2), SimTime(5.0), 5.0));
    }
}

// ── Waiting lists ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod waiting {
    use fleet_core::{AgentId, VertexId};
    use crate::WaitingLists;

    #[test]
    fn push_dedups_and_keeps_order() {
        let mut w = WaitingLists::new();
        assert!(w.push(VertexId(1), AgentId(3)));
        assert!(w.push(VertexId(1), AgentId(2)));
        assert!(!w.push(VertexId(1), AgentId(3)));
        assert_eq!(w.get(VertexId(1)), &[AgentId(3), AgentId(2)]);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn take_clears_only_that_vertex() {
        let mut w = WaitingLists::new();
        w.push(VertexId(1), AgentId(1));
        w.push(VertexId(2), AgentId(1));
        assert_eq!(w.take(VertexId(1)), vec![AgentId(1)]);
        assert!(w.get(VertexId(1)).is_empty());
        assert_eq!(w.get(VertexId(2)), &[AgentId(1)]);
        assert_eq!(w.len(), 1);
        assert_eq!(w.vertices().collect::<Vec<_>>(), vec![VertexId(2)]);
    }

    #[test]
    fn take_of_unknown_vertex_is_empty() {
        let mut w = WaitingLists::new();
        assert!(w.take(VertexId(9)).is_empty());
        assert!(w.is_empty());
    }
}

// ── Lease table ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod table {
    use fleet_core::{AgentId, EdgeKey, SimTime, VertexId};
    use crate::{Lease, LeaseTable};

    #[test]
    fn release_vertex_requires_holder() {
        let mut t = LeaseTable::new();
        t.stamp_vertex(VertexId(1), Lease::new(AgentId(1), SimTime::ZERO));
        assert!(!t.release_vertex(VertexId(1), AgentId(2)));
        assert!(t.vertex(VertexId(1)).is_some());
        assert!(t.release_vertex(VertexId(1), AgentId(1)));
        assert!(t.vertex(VertexId(1)).is_none());
        assert!(!t.release_vertex(VertexId(1), AgentId(1)));
    }

    #[test]
    fn release_edges_filters_by_holder_and_selector() {
        let mut t = LeaseTable::new();
        let a = Lease::new(AgentId(1), SimTime::ZERO);
        let b = Lease::new(AgentId(2), SimTime::ZERO);
        t.stamp_edge(EdgeKey::new(VertexId(1), VertexId(2)), a);
        t.stamp_edge(EdgeKey::new(VertexId(3), VertexId(4)), a);
        t.stamp_edge(EdgeKey::new(VertexId(2), VertexId(5)), b);

        let n = t.release_edges(AgentId(1), |e| e.touches(VertexId(2)));
        assert_eq!(n, 1);
        assert!(t.edge(EdgeKey::new(VertexId(3), VertexId(4))).is_some());
        assert!(t.edge(EdgeKey::new(VertexId(2), VertexId(5))).is_some());
    }

    #[test]
    fn purge_drops_only_expired() {
        let mut t = LeaseTable::new();
        t.stamp_vertex(VertexId(1), Lease::new(AgentId(1), SimTime(0.0)));
        t.stamp_vertex(VertexId(2), Lease::new(AgentId(1), SimTime(4.0)));
        assert_eq!(t.live_count(SimTime(6.0), 5.0), 1);
        assert_eq!(t.purge_expired(SimTime(6.0), 5.0), 1);
        assert_eq!(t.len(), 1);
        assert!(t.vertex(VertexId(2)).is_some());
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod coordinator {
    use fleet_core::{AgentId, EdgeKey, ReleaseScope, SimTime, VertexId};
    use super::helpers::path;
    use crate::{Contested, Lease, PathGrant, TrafficCoordinator};

    const A: AgentId = AgentId(1);
    const B: AgentId = AgentId(2);

    fn coordinator() -> TrafficCoordinator {
        TrafficCoordinator::new(5.0, ReleaseScope::AllEdges)
    }

    #[test]
    fn grant_stamps_all_but_last_vertex() {
        let mut tc = coordinator();
        let now = SimTime(1.0);
        assert_eq!(tc.request(A, &path(&[1, 2, 3]), now), PathGrant::Granted);

        assert_eq!(tc.vertex_holder(VertexId(1), now), Some(A));
        assert_eq!(tc.vertex_holder(VertexId(2), now), Some(A));
        assert_eq!(tc.vertex_holder(VertexId(3), now), None);
        assert_eq!(tc.edge_holder(VertexId(1), VertexId(2), now), Some(A));
        assert_eq!(tc.edge_holder(VertexId(2), VertexId(3), now), Some(A));
        assert_eq!(tc.edge_holder(VertexId(2), VertexId(1), now), None);
        assert_eq!(tc.live_lease_count(now), 4);
    }

    #[test]
    fn trivial_paths_grant_without_stamping() {
        let mut tc = coordinator();
        assert!(tc.request(A, &[], SimTime::ZERO).is_granted());
        assert!(tc.request(A, &path(&[4]), SimTime::ZERO).is_granted());
        assert!(tc.table().is_empty());
    }

    #[test]
    fn denial_reports_holder_and_queues_requester() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2, 3]), SimTime(0.0)).is_granted());

        let grant = tc.request(B, &path(&[2, 1]), SimTime(1.0));
        assert_eq!(
            grant,
            PathGrant::Denied { holder: A, contested: Contested::Vertex(VertexId(2)) }
        );
        assert_eq!(grant.holder(), Some(A));
        assert_eq!(tc.waiting(VertexId(2)), &[B]);
    }

    #[test]
    fn denial_stamps_nothing() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[3, 4]), SimTime(0.0)).is_granted());
        let before = tc.table().len();

        // 1 and 2 are free, 3 is not: nothing may be stamped.
        assert!(!tc.request(B, &path(&[1, 2, 3, 4]), SimTime(1.0)).is_granted());
        assert_eq!(tc.table().len(), before);
        assert_eq!(tc.vertex_holder(VertexId(1), SimTime(1.0)), None);
        assert_eq!(tc.edge_holder(VertexId(1), VertexId(2), SimTime(1.0)), None);
    }

    #[test]
    fn repeated_denial_queues_once() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        for t in 1..4 {
            assert!(!tc.request(B, &path(&[1, 2]), SimTime(t as f64)).is_granted());
        }
        assert_eq!(tc.waiting(VertexId(1)), &[B]);
    }

    #[test]
    fn own_leases_do_not_block_and_are_refreshed() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        assert!(tc.request(A, &path(&[1, 2]), SimTime(4.0)).is_granted());
        // Refreshed at 4.0, so still live at 8.0.
        assert_eq!(tc.vertex_holder(VertexId(1), SimTime(8.0)), Some(A));
    }

    #[test]
    fn expired_lease_does_not_block() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        assert!(!tc.request(B, &path(&[1, 2]), SimTime(4.999)).is_granted());
        assert!(tc.request(B, &path(&[1, 2]), SimTime(5.0)).is_granted());
        assert_eq!(tc.vertex_holder(VertexId(1), SimTime(5.0)), Some(B));
    }

    #[test]
    fn edge_contention_is_detected() {
        let mut tc = coordinator();
        tc.table_mut().stamp_edge(EdgeKey::new(VertexId(2), VertexId(3)), Lease::new(A, SimTime::ZERO));
        let grant = tc.request(B, &path(&[1, 2, 3]), SimTime(1.0));
        assert_eq!(
            grant,
            PathGrant::Denied {
                holder:    A,
                contested: Contested::Edge(EdgeKey::new(VertexId(2), VertexId(3))),
            }
        );
        // Queued at the tail of the contested edge.
        assert_eq!(tc.waiting(VertexId(2)), &[B]);
    }

    #[test]
    fn probe_is_read_only() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        assert_eq!(tc.probe(B, &path(&[1, 2]), SimTime(1.0)).holder(), Some(A));
        assert!(tc.probe(B, &path(&[5, 6]), SimTime(1.0)).is_granted());
        assert!(tc.waiting(VertexId(1)).is_empty());
        assert_eq!(tc.vertex_holder(VertexId(5), SimTime(1.0)), None);
    }

    #[test]
    fn release_returns_waiters_and_frees_vertex() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2, 3]), SimTime(0.0)).is_granted());
        assert!(!tc.request(B, &path(&[2, 1]), SimTime(1.0)).is_granted());

        let waiters = tc.release(A, VertexId(2));
        assert_eq!(waiters, vec![B]);
        assert!(tc.waiting(VertexId(2)).is_empty());
        assert_eq!(tc.vertex_holder(VertexId(2), SimTime(1.0)), None);
        // AllEdges: every edge A held is gone, vertex 1 is still held.
        assert_eq!(tc.edge_holder(VertexId(1), VertexId(2), SimTime(1.0)), None);
        assert_eq!(tc.edge_holder(VertexId(2), VertexId(3), SimTime(1.0)), None);
        assert_eq!(tc.vertex_holder(VertexId(1), SimTime(1.0)), Some(A));
    }

    #[test]
    fn incident_scope_keeps_unrelated_edges() {
        let mut tc = TrafficCoordinator::new(5.0, ReleaseScope::IncidentEdges);
        assert!(tc.request(A, &path(&[1, 2, 3, 4]), SimTime(0.0)).is_granted());
        let _ = tc.release(A, VertexId(1));
        assert_eq!(tc.edge_holder(VertexId(1), VertexId(2), SimTime(0.0)), None);
        assert_eq!(tc.edge_holder(VertexId(2), VertexId(3), SimTime(0.0)), Some(A));
        assert_eq!(tc.edge_holder(VertexId(3), VertexId(4), SimTime(0.0)), Some(A));
    }

    #[test]
    fn release_by_non_holder_is_noop_but_returns_waiters() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        assert!(!tc.request(B, &path(&[1, 2]), SimTime(0.5)).is_granted());

        let waiters = tc.release(B, VertexId(1));
        assert_eq!(waiters, vec![B]);
        assert_eq!(tc.vertex_holder(VertexId(1), SimTime(0.5)), Some(A));
    }

    #[test]
    fn release_is_idempotent() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        let _ = tc.release(A, VertexId(1));
        let len = tc.table().len();
        assert!(tc.release(A, VertexId(1)).is_empty());
        assert_eq!(tc.table().len(), len);
    }

    #[test]
    fn purge_expired_leases() {
        let mut tc = coordinator();
        assert!(tc.request(A, &path(&[1, 2]), SimTime(0.0)).is_granted());
        assert_eq!(tc.purge_expired(SimTime(1.0)), 0);
        assert_eq!(tc.purge_expired(SimTime(5.0)), 2);
        assert!(tc.table().is_empty());
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use fleet_core::{AgentId, ReleaseScope, SimTime, VertexId};
    use crate::TrafficCoordinator;

    /// One random step against a line of vertices `0..12`.
    #[derive(Debug, Clone)]
    enum Op {
        Request { agent: u32, start: u32, len: u32, forward: bool },
        Release { agent: u32, vertex: u32 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (1u32..5, 0u32..10, 1u32..5, any::<bool>())
                .prop_map(|(agent, start, len, forward)| Op::Request { agent, start, len, forward }),
            1 => (1u32..5, 0u32..12).prop_map(|(agent, vertex)| Op::Release { agent, vertex }),
        ]
    }

    fn line(start: u32, len: u32, forward: bool) -> Vec<VertexId> {
        let mut p: Vec<VertexId> = (start..start + len).map(VertexId).collect();
        if !forward {
            p.reverse();
        }
        p
    }

    /// Live holders of every element a path would stamp.
    fn holders(tc: &TrafficCoordinator, path: &[VertexId], now: SimTime) -> Vec<Option<AgentId>> {
        path.windows(2)
            .flat_map(|w| [tc.vertex_holder(w[0], now), tc.edge_holder(w[0], w[1], now)])
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// A grant never overrides another agent's live lease, and a denial
        /// changes nothing on the requested path.
        #[test]
        fn exclusive_and_all_or_nothing(
            ops in prop::collection::vec((op(), 0.0f64..2.0), 1..60),
            incident in any::<bool>(),
        ) {
            let scope = if incident { ReleaseScope::IncidentEdges } else { ReleaseScope::AllEdges };
            let mut tc = TrafficCoordinator::new(5.0, scope);
            let mut now = SimTime::ZERO;

            for (op, dt) in ops {
                now = now + dt;
                match op {
                    Op::Request { agent, start, len, forward } => {
                        let agent = AgentId(agent);
                        let path = line(start, len, forward);
                        let before = holders(&tc, &path, now);
                        let foreign = before.iter().any(|h| h.is_some_and(|h| h != agent));

                        let grant = tc.request(agent, &path, now);
                        prop_assert_eq!(grant.is_granted(), !foreign);

                        let after = holders(&tc, &path, now);
                        if grant.is_granted() {
                            prop_assert!(after.iter().all(|h| *h == Some(agent)));
                        } else {
                            prop_assert_eq!(after, before);
                            prop_assert!(tc.waiting_lists().vertices().count() > 0);
                        }
                    }
                    Op::Release { agent, vertex } => {
                        let agent = AgentId(agent);
                        let vertex = VertexId(vertex);
                        let _ = tc.release(agent, vertex);
                        let len = tc.table().len();
                        prop_assert!(tc.release(agent, vertex).is_empty());
                        prop_assert_eq!(tc.table().len(), len);
                        prop_assert_ne!(tc.vertex_holder(vertex, now), Some(agent));
                    }
                }
            }
        }
    }
}
