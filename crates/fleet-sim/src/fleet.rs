//! The `FleetOrchestrator` and its tick loop.

use tracing::{debug, info, warn};

use fleet_agent::{Agent, AgentRoster, VertexTransition};
use fleet_core::{AgentId, AgentStatus, FleetConfig, SimTime, VertexId};
use fleet_graph::NavGraph;
use fleet_traffic::{PathGrant, TrafficCoordinator};

use crate::{FleetError, FleetObserver, FleetResult, FleetSnapshot, TickReport};

/// Result of one retry attempt on behalf of a blocked agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retry {
    /// Not BLOCKED, or no target to retry.
    Skipped,
    Granted,
    Denied,
}

// ── FleetOrchestrator ─────────────────────────────────────────────────────────

/// Owns every agent and the traffic coordinator, and drives the tick.
///
/// `FleetOrchestrator<G>` is a single-writer structure: every method that
/// changes state takes `&mut self`.  Sharing it between drivers is the job of
/// [`FleetRuntime`][crate::FleetRuntime].
///
/// # Tick phases
///
/// 1. **Advance** (optionally parallel with the `parallel` feature): every
///    MOVING agent steps by `delta × agent_speed`.
/// 2. **Release** (sequential, ascending `AgentId`): each vertex crossing
///    releases the vertex left behind; the returned waiters that are BLOCKED
///    are retried immediately.
/// 3. **Periodic retry**: every BLOCKED agent whose last retry is at least
///    `retry_interval` old is retried.
///
/// Create via [`FleetBuilder`][crate::FleetBuilder] or [`FleetOrchestrator::new`].
pub struct FleetOrchestrator<G: NavGraph> {
    config:     FleetConfig,
    graph:      G,
    traffic:    TrafficCoordinator,
    agents:     AgentRoster,
    last_tick:  Option<SimTime>,
    tick_count: u64,
}

impl<G: NavGraph> FleetOrchestrator<G> {
    /// Validate `config` and create an empty fleet on `graph`.
    pub fn new(graph: G, config: FleetConfig) -> FleetResult<Self> {
        config.validate()?;
        Ok(Self {
            traffic:    TrafficCoordinator::from_config(&config),
            config,
            graph,
            agents:     AgentRoster::new(),
            last_tick:  None,
            tick_count: 0,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn traffic(&self) -> &TrafficCoordinator {
        &self.traffic
    }

    pub fn agents(&self) -> &AgentRoster {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_tick(&self) -> Option<SimTime> {
        self.last_tick
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Place a new IDLE agent on `vertex`.
    pub fn spawn(&mut self, vertex: VertexId) -> FleetResult<AgentId> {
        let position = self
            .graph
            .vertex_position(vertex)
            .ok_or(FleetError::UnknownVertex(vertex))?;
        let id = self.agents.spawn(vertex, position);
        info!(agent = %id, vertex = %vertex, "spawned");
        Ok(id)
    }

    /// Send an IDLE or TASK_COMPLETE agent to `target`.
    ///
    /// Invalid requests fail without touching the fleet.  A denied
    /// reservation marks the agent BLOCKED, records the holder, and returns
    /// [`FleetError::Blocked`]; the periodic retry picks it up from there.
    pub fn assign(&mut self, agent: AgentId, target: VertexId, now: SimTime) -> FleetResult<()> {
        let status = self
            .agents
            .get(agent)
            .map(Agent::status)
            .ok_or(FleetError::UnknownAgent(agent))?;
        if !self.graph.contains(target) {
            return Err(FleetError::UnknownVertex(target));
        }
        if !status.is_assignable() {
            return Err(FleetError::NotAssignable { agent, status });
        }
        info!(agent = %agent, target = %target, "assign");
        self.reserve(agent, target, now)
    }

    /// Abandon the task of a MOVING or WAITING agent.
    ///
    /// Releases the agent's current vertex; every waiter handed back is
    /// retried at `now`.  Other leases of the agent simply expire.
    pub fn cancel(&mut self, agent: AgentId, now: SimTime) -> FleetResult<()> {
        let a = self.agents.get_mut(agent).ok_or(FleetError::UnknownAgent(agent))?;
        let status = a.status();
        if !status.is_cancellable() {
            return Err(FleetError::NotCancellable { agent, status });
        }
        let vertex = a.current_vertex();
        a.cancel();
        info!(agent = %agent, vertex = %vertex, "cancelled");

        let waiters = self.traffic.release(agent, vertex);
        for waiter in waiters {
            self.retry(waiter, now);
        }
        Ok(())
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Apply one tick at `now`.
    ///
    /// The movement step is `now - last_tick` clamped to
    /// `[0, config.max_step]`; the very first tick moves nothing.
    pub fn tick(&mut self, now: SimTime) -> TickReport {
        let delta = match self.last_tick {
            None => 0.0,
            Some(prev) => now.since(prev).clamp(0.0, self.config.max_step),
        };
        self.last_tick = Some(now);
        self.tick_count += 1;

        let mut report = TickReport { tick: self.tick_count, now, delta, ..TickReport::default() };

        // ── Phase 1: advance ──────────────────────────────────────────────
        let (advanced, transitions) = self.advance_all(delta);
        report.advanced = advanced;

        // ── Phase 2: release left-behind vertices, retry their waiters ────
        //
        // Transitions arrive in ascending AgentId order, so release and retry
        // order is deterministic even when phase 1 ran in parallel.
        for t in transitions {
            if t.completed {
                report.completed += 1;
                info!(agent = %t.agent, vertex = %t.reached, "task complete");
            } else {
                report.crossed += 1;
            }
            let waiters = self.traffic.release(t.agent, t.left);
            for waiter in waiters {
                self.count_retry(waiter, now, &mut report);
            }
        }

        // ── Phase 3: periodic retry of blocked agents ─────────────────────
        let interval = self.config.retry_interval;
        let due: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|a| a.is_blocked() && a.target_vertex().is_some() && a.retry_due(now, interval))
            .map(Agent::id)
            .collect();
        for agent in due {
            self.count_retry(agent, now, &mut report);
        }

        for a in &self.agents {
            match a.status() {
                AgentStatus::Moving => report.moving += 1,
                AgentStatus::Blocked => report.blocked += 1,
                _ => {}
            }
        }
        report
    }

    /// [`tick`](Self::tick) wrapped in observer callbacks.  Emits a snapshot
    /// every `config.snapshot_interval_ticks` ticks.
    pub fn step<O: FleetObserver>(&mut self, now: SimTime, observer: &mut O) -> TickReport {
        observer.on_tick_start(self.tick_count + 1, now);
        let report = self.tick(now);
        observer.on_tick_end(&report);
        let every = self.config.snapshot_interval_ticks;
        if every > 0 && report.tick.is_multiple_of(every) {
            observer.on_snapshot(&self.snapshot());
        }
        report
    }

    /// Run `n` ticks of `dt` simulated time each, starting from the last
    /// tick (or zero), then call `on_sim_end`.
    ///
    /// Deterministic stand-in for the wall-clock driver; used by tests and
    /// offline runs.
    pub fn run_fixed<O: FleetObserver>(&mut self, n: u64, dt: f64, observer: &mut O) {
        let mut now = self.last_tick.unwrap_or(SimTime::ZERO);
        for _ in 0..n {
            now = now + dt;
            self.step(now, observer);
        }
        observer.on_sim_end(self.tick_count);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Owned copy of every agent, ascending id.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            tick:   self.tick_count,
            now:    self.last_tick,
            agents: self.agents.iter().map(Agent::snapshot).collect(),
        }
    }

    /// Agents queued on `vertex` in the traffic coordinator.
    pub fn waiting(&self, vertex: VertexId) -> Vec<AgentId> {
        self.traffic.waiting(vertex).to_vec()
    }

    /// Agents whose current vertex is `vertex`, ascending id.
    pub fn agents_at(&self, vertex: VertexId) -> Vec<AgentId> {
        self.agents.at_vertex(vertex).collect()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Compute a path and reserve it.  No eligibility check: callers decide
    /// which statuses may reserve.
    fn reserve(&mut self, agent: AgentId, target: VertexId, now: SimTime) -> FleetResult<()> {
        let a = self.agents.get_mut(agent).ok_or(FleetError::UnknownAgent(agent))?;
        let from = a.current_vertex();
        let path = self.graph.shortest_path(from, target)?;

        match self.traffic.request(agent, &path, now) {
            PathGrant::Granted => {
                let start = self.graph.vertex_position(from).unwrap_or(a.position());
                debug!(agent = %agent, hops = path.len().saturating_sub(1), "moving");
                a.start(target, path, start);
                Ok(())
            }
            PathGrant::Denied { holder, contested } => {
                a.set_blocked(holder, target);
                debug!(agent = %agent, holder = %holder, contested = %contested, "blocked");
                Err(FleetError::Blocked { agent, holder })
            }
        }
    }

    /// Re-attempt the reservation of a BLOCKED agent with a target.
    fn retry(&mut self, agent: AgentId, now: SimTime) -> Retry {
        let Some(a) = self.agents.get_mut(agent) else {
            return Retry::Skipped;
        };
        let Some(target) = a.target_vertex().filter(|_| a.is_blocked()) else {
            return Retry::Skipped;
        };
        a.note_retry(now);

        match self.reserve(agent, target, now) {
            Ok(()) => {
                info!(agent = %agent, target = %target, "retry granted");
                Retry::Granted
            }
            Err(FleetError::Blocked { .. }) => Retry::Denied,
            Err(e) => {
                warn!(agent = %agent, target = %target, error = %e, "retry failed");
                Retry::Denied
            }
        }
    }

    fn count_retry(&mut self, agent: AgentId, now: SimTime, report: &mut TickReport) {
        match self.retry(agent, now) {
            Retry::Skipped => {}
            Retry::Granted => {
                report.retries += 1;
                report.regranted += 1;
            }
            Retry::Denied => report.retries += 1,
        }
    }

    /// Phase 1.  Returns the number of MOVING agents stepped and their
    /// crossings in ascending id order.
    fn advance_all(&mut self, delta: f64) -> (usize, Vec<VertexTransition>) {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let speed = self.config.agent_speed;
        let graph = &self.graph;
        let positions = |v: VertexId| graph.vertex_position(v);

        #[cfg(not(feature = "parallel"))]
        {
            let mut advanced = 0;
            let mut transitions = Vec::new();
            for a in self.agents.iter_mut().filter(|a| a.is_moving()) {
                advanced += 1;
                if let Some(t) = a.advance(delta, speed, &positions) {
                    transitions.push(t);
                }
            }
            (advanced, transitions)
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let stepped: Vec<Option<VertexTransition>> = self
                .agents
                .as_mut_slice()
                .par_iter_mut()
                .filter(|a| a.is_moving())
                .map(|a| a.advance(delta, speed, &positions))
                .collect();
            let advanced = stepped.len();
            (advanced, stepped.into_iter().flatten().collect())
        }
    }
}
