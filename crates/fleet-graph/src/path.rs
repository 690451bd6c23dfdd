//! Shortest paths over a [`NavNetwork`].
//!
//! # Cost units
//!
//! Edge costs are integer **thousandths of a length unit** (u32).  Ties are
//! broken by slot, which is ascending `VertexId`, so the same query on the
//! same network always yields the same path.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fleet_core::VertexId;

use crate::network::NavNetwork;
use crate::{GraphError, GraphResult};

/// Sentinel in `prev` for slots that were never reached.
const UNREACHED: u32 = u32::MAX;

/// Dijkstra from `from` to `to`; returns every vertex on the way, endpoints
/// included.
pub fn dijkstra(network: &NavNetwork, from: VertexId, to: VertexId) -> GraphResult<Vec<VertexId>> {
    let src = network.slot(from).ok_or(GraphError::UnknownVertex(from))?;
    let dst = network.slot(to).ok_or(GraphError::UnknownVertex(to))?;

    if src == dst {
        return Ok(vec![from]);
    }

    let n = network.vertex_count();
    // dist[s] = best known cost to reach slot s.
    let mut dist = vec![u32::MAX; n];
    // prev[s] = slot we came from; UNREACHED otherwise.
    let mut prev = vec![UNREACHED; n];

    dist[src] = 0;

    let mut heap: BinaryHeap<Reverse<(u32, u32)>> = BinaryHeap::new();
    heap.push(Reverse((0, src as u32)));

    while let Some(Reverse((cost, slot))) = heap.pop() {
        let slot = slot as usize;
        if slot == dst {
            return Ok(reconstruct(network, &prev, src, dst));
        }

        // Stale heap entry.
        if cost > dist[slot] {
            continue;
        }

        for edge in network.out_edges(slot) {
            let next = network.edge_to[edge] as usize;
            let new_cost = cost.saturating_add(network.edge_cost[edge]);

            if new_cost < dist[next] {
                dist[next] = new_cost;
                prev[next] = slot as u32;
                heap.push(Reverse((new_cost, next as u32)));
            }
        }
    }

    Err(GraphError::NoPath { from, to })
}

fn reconstruct(network: &NavNetwork, prev: &[u32], src: usize, dst: usize) -> Vec<VertexId> {
    let mut path = vec![network.ids[dst]];
    let mut cur = dst;
    while cur != src {
        cur = prev[cur] as usize;
        path.push(network.ids[cur]);
    }
    path.reverse();
    path
}
