//! `AgentRoster`: every spawned agent, indexed by id.
//!
//! Agents are never destroyed and ids are handed out densely from
//! [`AgentId::FIRST`], so a plain `Vec` indexed by `id - 1` is the whole
//! store.  Iteration order is ascending id order.

use fleet_core::{AgentId, Point, VertexId};

use crate::Agent;

#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: Vec<Agent>,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of `id` in `agents`, if it was ever handed out.
    #[inline]
    fn index(&self, id: AgentId) -> Option<usize> {
        let i = (id.get() as usize).checked_sub(1)?;
        (i < self.agents.len()).then_some(i)
    }

    /// Add an IDLE agent at `vertex` under the next id.
    pub fn spawn(&mut self, vertex: VertexId, position: Point) -> AgentId {
        let id = AgentId(self.agents.len() as u32 + 1);
        self.agents.push(Agent::new(id, vertex, position));
        id
    }

    /// The id the next `spawn` will hand out.
    pub fn next_id(&self) -> AgentId {
        AgentId(self.agents.len() as u32 + 1)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index(id).map(|i| &self.agents[i])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.index(id).map(move |i| &mut self.agents[i])
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.index(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// All agents, ascending id.
    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Agent> {
        self.agents.iter_mut()
    }

    /// Mutable slice for bulk phases (the parallel advance in `fleet-sim`).
    pub fn as_mut_slice(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Agents whose current vertex is `vertex`, ascending id.
    pub fn at_vertex(&self, vertex: VertexId) -> impl Iterator<Item = AgentId> + '_ {
        self.agents
            .iter()
            .filter(move |a| a.current_vertex() == vertex)
            .map(Agent::id)
    }
}

impl<'a> IntoIterator for &'a AgentRoster {
    type Item = &'a Agent;
    type IntoIter = std::slice::Iter<'a, Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
