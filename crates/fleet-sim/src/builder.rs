//! Fluent builder for constructing a [`FleetOrchestrator`].

use fleet_core::{FleetConfig, VertexId};
use fleet_graph::NavGraph;

use crate::{FleetOrchestrator, FleetResult};

/// Fluent builder for [`FleetOrchestrator<G>`].
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                  |
/// |-------------------|--------------------------|
/// | `.config(c)`      | `FleetConfig::default()` |
/// | `.spawn_at(v)`    | no agents                |
///
/// # Example
///
/// ```rust,ignore
/// let mut fleet = FleetBuilder::new(network)
///     .config(config)
///     .spawn_at(dock_a)
///     .spawn_at(dock_b)
///     .build()?;
/// fleet.run_fixed(100, 0.1, &mut NoopObserver);
/// ```
pub struct FleetBuilder<G: NavGraph> {
    graph:  G,
    config: FleetConfig,
    spawns: Vec<VertexId>,
}

impl<G: NavGraph> FleetBuilder<G> {
    pub fn new(graph: G) -> Self {
        Self { graph, config: FleetConfig::default(), spawns: Vec::new() }
    }

    pub fn config(mut self, config: FleetConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn an IDLE agent on `vertex` at build time.  Ids follow call order
    /// starting at 1.
    pub fn spawn_at(mut self, vertex: VertexId) -> Self {
        self.spawns.push(vertex);
        self
    }

    /// Validate the configuration, place the initial agents, and return a
    /// ready fleet.
    ///
    /// Fails with `Config` for an invalid configuration or `UnknownVertex`
    /// for a spawn vertex outside the graph.
    pub fn build(self) -> FleetResult<FleetOrchestrator<G>> {
        let mut fleet = FleetOrchestrator::new(self.graph, self.config)?;
        for vertex in self.spawns {
            fleet.spawn(vertex)?;
        }
        Ok(fleet)
    }
}
