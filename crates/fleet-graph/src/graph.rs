//! The `NavGraph` trait: what the fleet needs from a navigation graph.
//!
//! # Pluggability
//!
//! `fleet-sim` is generic over `G: NavGraph`, so a graph backed by a
//! different store or a different path algorithm (A*, precomputed tables)
//! drops in without touching the traffic layer.
//!
//! # Thread safety
//!
//! Implementations must be `Send + Sync`: the orchestrator lives on the
//! simulation thread, and the `parallel` feature of `fleet-sim` reads vertex
//! positions from Rayon workers.

use std::collections::BTreeMap;

use fleet_core::{Point, VertexId};

use crate::GraphResult;

/// One site on the navigation graph.  Immutable after the graph is built.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub position: Point,
    /// Free-form attributes carried over from the floor plan
    /// (`name`, `is_charger`, …).
    pub meta: BTreeMap<String, String>,
}

impl Vertex {
    pub fn at(position: Point) -> Self {
        Self { position, meta: BTreeMap::new() }
    }

    /// Attach one metadata entry (builder style).
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// The `name` metadata entry, if the floor plan provided one.
    pub fn name(&self) -> Option<&str> {
        self.meta.get("name").map(String::as_str)
    }
}

/// Read-only navigation graph consumed by the fleet.
pub trait NavGraph: Send + Sync {
    /// Look up a vertex.  `None` if `id` is not part of the graph.
    fn vertex(&self, id: VertexId) -> Option<&Vertex>;

    /// Every vertex, in ascending id order.
    fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_;

    /// Ordered vertex ids from `from` to `to`, both included.
    ///
    /// `from == to` yields the single-vertex path `[from]`.  Disconnected
    /// endpoints yield [`GraphError::NoPath`][crate::GraphError::NoPath].
    fn shortest_path(&self, from: VertexId, to: VertexId) -> GraphResult<Vec<VertexId>>;

    /// Position of `id`, or `None` if it is not part of the graph.
    #[inline]
    fn vertex_position(&self, id: VertexId) -> Option<Point> {
        self.vertex(id).map(|v| v.position)
    }

    #[inline]
    fn contains(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }
}
