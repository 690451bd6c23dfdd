//! In-memory navigation network and its builder.
//!
//! # Data layout
//!
//! Vertices are stored densely in ascending `VertexId` order; the position of
//! a vertex in that order is its *slot*.  Outgoing edges use **Compressed
//! Sparse Row (CSR)** format over slots:
//!
//! ```text
//! edge_to[ out_start[s] .. out_start[s+1] ]
//! ```
//!
//! so a vertex's neighbours are one contiguous scan in Dijkstra's inner loop.
//! Vertex ids supplied by a floor plan need not be dense; `slot_of` maps them.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) answers "which vertex is under this point", the
//! hit-test a presentation layer runs on every click.

use std::collections::HashMap;
use std::ops::Range;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fleet_core::{Point, VertexId};

use crate::{GraphError, GraphResult, NavGraph, Vertex};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct VertexEntry {
    point: [f64; 2], // [x, y]
    id:    VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NavNetwork ────────────────────────────────────────────────────────────────

/// Directed navigation graph in CSR format plus a nearest-vertex index.
///
/// Construct with [`NavNetworkBuilder`].
pub struct NavNetwork {
    /// Vertex data indexed by slot.
    pub vertices: Vec<Vertex>,

    /// Slot → id.  Strictly ascending.
    pub ids: Vec<VertexId>,

    /// CSR row pointer.  Length = `vertex_count + 1`.
    pub out_start: Vec<u32>,

    /// Source slot of each edge (redundant with CSR, used for path
    /// reconstruction).
    pub edge_from: Vec<u32>,

    /// Destination slot of each edge.
    pub edge_to: Vec<u32>,

    /// Traversal cost in thousandths of a length unit.  Used as Dijkstra
    /// weight.
    pub edge_cost: Vec<u32>,

    slot_of:     HashMap<VertexId, u32>,
    spatial_idx: RTree<VertexEntry>,
}

impl NavNetwork {
    /// A network with no vertices.  Every path query fails.
    pub fn empty() -> Self {
        NavNetworkBuilder::new().build_unchecked()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    // ── Slot helpers ──────────────────────────────────────────────────────

    /// Dense slot of `id`, if it belongs to the network.
    #[inline]
    pub fn slot(&self, id: VertexId) -> Option<usize> {
        self.slot_of.get(&id).map(|&s| s as usize)
    }

    /// Edge index range of the outgoing edges of `slot`.
    #[inline]
    pub(crate) fn out_edges(&self, slot: usize) -> Range<usize> {
        self.out_start[slot] as usize..self.out_start[slot + 1] as usize
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    /// Vertices reachable from `id` over one edge.  Empty for unknown ids.
    pub fn neighbors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        let range = self.slot(id).map(|s| self.out_edges(s)).unwrap_or(0..0);
        range.map(move |e| self.ids[self.edge_to[e] as usize])
    }

    /// `true` if a directed edge `from -> to` exists.
    pub fn has_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.neighbors(from).any(|n| n == to)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The vertex closest to `pos`, optionally only if within `max_distance`.
    ///
    /// Returns `None` for an empty network or when the nearest vertex is too
    /// far away (a click on empty floor).
    pub fn nearest_vertex(&self, pos: Point, max_distance: Option<f64>) -> Option<VertexId> {
        let entry = self.spatial_idx.nearest_neighbor(&[pos.x, pos.y])?;
        match max_distance {
            Some(limit) if entry.distance_2(&[pos.x, pos.y]) > limit * limit => None,
            _ => Some(entry.id),
        }
    }

    /// Axis-aligned bounding box `(min, max)` over all vertex positions.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.vertices.first()?.position;
        let (lo, hi) = self.vertices.iter().fold((first, first), |(lo, hi), v| {
            let p = v.position;
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Some((lo, hi))
    }
}

impl NavGraph for NavNetwork {
    fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.slot(id).map(|s| &self.vertices[s])
    }

    fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.ids.iter().copied().zip(self.vertices.iter())
    }

    fn shortest_path(&self, from: VertexId, to: VertexId) -> GraphResult<Vec<VertexId>> {
        crate::path::dijkstra(self, from, to)
    }
}

// ── NavNetworkBuilder ─────────────────────────────────────────────────────────

/// Construct a [`NavNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use fleet_core::Point;
/// use fleet_graph::{NavGraph, NavNetworkBuilder};
///
/// let mut b = NavNetworkBuilder::new();
/// let dock = b.add_vertex(Point::new(0.0, 0.0));
/// let shelf = b.add_vertex(Point::new(4.0, 0.0));
/// b.add_lane(dock, shelf);
/// let net = b.build().unwrap();
/// assert_eq!(net.edge_count(), 2); // one per direction
/// assert_eq!(net.shortest_path(dock, shelf).unwrap(), vec![dock, shelf]);
/// ```
pub struct NavNetworkBuilder {
    vertices:  Vec<(VertexId, Vertex)>,
    seen:      HashMap<VertexId, usize>,
    raw_edges: Vec<RawEdge>,
    next_id:   u32,
}

struct RawEdge {
    from: VertexId,
    to:   VertexId,
    /// Explicit cost in length units; `None` means Euclidean length.
    cost: Option<f64>,
}

impl NavNetworkBuilder {
    pub fn new() -> Self {
        Self {
            vertices:  Vec::new(),
            seen:      HashMap::new(),
            raw_edges: Vec::new(),
            next_id:   0,
        }
    }

    /// Add a vertex under the next free id (one past the largest id so far).
    pub fn add_vertex(&mut self, pos: Point) -> VertexId {
        let id = VertexId(self.next_id);
        self.push(id, Vertex::at(pos));
        id
    }

    /// Add a vertex under an id chosen by the caller (e.g. from a floor plan).
    pub fn insert_vertex(&mut self, id: VertexId, vertex: Vertex) -> GraphResult<VertexId> {
        if self.seen.contains_key(&id) {
            return Err(GraphError::DuplicateVertex(id));
        }
        self.push(id, vertex);
        Ok(id)
    }

    fn push(&mut self, id: VertexId, vertex: Vertex) {
        self.seen.insert(id, self.vertices.len());
        self.vertices.push((id, vertex));
        self.next_id = self.next_id.max(id.0.saturating_add(1));
    }

    /// Add a **directed** edge weighted by the Euclidean distance between its
    /// endpoints.
    pub fn add_directed_edge(&mut self, from: VertexId, to: VertexId) {
        self.raw_edges.push(RawEdge { from, to, cost: None });
    }

    /// Add a directed edge with an explicit traversal cost.
    pub fn add_directed_edge_with_cost(&mut self, from: VertexId, to: VertexId, cost: f64) {
        self.raw_edges.push(RawEdge { from, to, cost: Some(cost) });
    }

    /// Convenience: add edges in **both directions** (the common case for a
    /// warehouse aisle).
    pub fn add_lane(&mut self, a: VertexId, b: VertexId) {
        self.add_directed_edge(a, b);
        self.add_directed_edge(b, a);
    }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate edges and produce a [`NavNetwork`].
    ///
    /// Fails with [`GraphError::UnknownVertex`] if an edge references a
    /// vertex that was never added.
    pub fn build(self) -> GraphResult<NavNetwork> {
        for e in &self.raw_edges {
            for id in [e.from, e.to] {
                if !self.seen.contains_key(&id) {
                    return Err(GraphError::UnknownVertex(id));
                }
            }
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> NavNetwork {
        let mut vertices = self.vertices;
        vertices.sort_by_key(|(id, _)| *id);

        let slot_of: HashMap<VertexId, u32> = vertices
            .iter()
            .enumerate()
            .map(|(slot, (id, _))| (*id, slot as u32))
            .collect();

        // Resolve edges to slots; edges to unknown vertices were rejected by
        // `build`, `empty()` has none.
        let mut raw: Vec<(u32, u32, u32)> = self
            .raw_edges
            .iter()
            .filter_map(|e| {
                let from = *slot_of.get(&e.from)?;
                let to = *slot_of.get(&e.to)?;
                let length = e.cost.unwrap_or_else(|| {
                    vertices[from as usize].1.position.distance(vertices[to as usize].1.position)
                });
                Some((from, to, milli_cost(length)))
            })
            .collect();
        raw.sort_unstable_by_key(|&(from, to, _)| (from, to));

        let vertex_count = vertices.len();
        let mut out_start = vec![0u32; vertex_count + 1];
        for &(from, _, _) in &raw {
            out_start[from as usize + 1] += 1;
        }
        for i in 1..=vertex_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[vertex_count] as usize, raw.len());

        let entries: Vec<VertexEntry> = vertices
            .iter()
            .map(|(id, v)| VertexEntry { point: [v.position.x, v.position.y], id: *id })
            .collect();

        let (ids, vertices): (Vec<VertexId>, Vec<Vertex>) = vertices.into_iter().unzip();

        NavNetwork {
            vertices,
            ids,
            out_start,
            edge_from: raw.iter().map(|e| e.0).collect(),
            edge_to:   raw.iter().map(|e| e.1).collect(),
            edge_cost: raw.iter().map(|e| e.2).collect(),
            slot_of,
            spatial_idx: RTree::bulk_load(entries),
        }
    }
}

impl Default for NavNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Length units → integer thousandths, saturating.
fn milli_cost(length: f64) -> u32 {
    (length.max(0.0) * 1000.0).round().min(u32::MAX as f64) as u32
}
