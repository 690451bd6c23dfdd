//! The per-robot state machine.
//!
//! | From                          | Call                     | To            |
//! |-------------------------------|--------------------------|---------------|
//! | IDLE, TASK_COMPLETE, BLOCKED  | `start`                  | MOVING        |
//! | MOVING                        | `advance` on last vertex | TASK_COMPLETE |
//! | IDLE, TASK_COMPLETE, BLOCKED  | `set_blocked`            | BLOCKED       |
//! | any                           | `cancel`                 | IDLE          |
//!
//! Which calls are allowed from which status is the orchestrator's policy;
//! the agent applies whatever it is told.
//!
//! Every transition keeps two invariants:
//!
//! - `path` is non-empty exactly when the status is MOVING;
//! - a target is carried exactly when the status is MOVING, BLOCKED or
//!   WAITING.
//!
//! The agent never talks to the traffic layer itself.  [`Agent::advance`]
//! reports vertex crossings and the orchestrator releases reservations.

use fleet_core::{AgentId, AgentStatus, Point, SimTime, VertexId};

use crate::motion::interpolate;
use crate::AgentSnapshot;

/// A vertex crossing produced by [`Agent::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexTransition {
    pub agent:     AgentId,
    /// Vertex the agent was standing on before this step.
    pub left:      VertexId,
    /// Vertex the agent stands on now.
    pub reached:   VertexId,
    /// `true` when this step finished the task.  `left == reached` then.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    id:              AgentId,
    status:          AgentStatus,
    current_vertex:  VertexId,
    target_vertex:   Option<VertexId>,
    path:            Vec<VertexId>,
    /// Index into `path` of the tail of the edge being traversed.
    path_cursor:     usize,
    position:        Point,
    edge_progress:   f64,
    blocked_by:      Option<AgentId>,
    last_retry_time: Option<SimTime>,
}

impl Agent {
    /// An IDLE agent standing on `vertex`.
    pub fn new(id: AgentId, vertex: VertexId, position: Point) -> Self {
        Self {
            id,
            status:          AgentStatus::Idle,
            current_vertex:  vertex,
            target_vertex:   None,
            path:            Vec::new(),
            path_cursor:     0,
            position,
            edge_progress:   0.0,
            blocked_by:      None,
            last_retry_time: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> AgentId { self.id }
    #[inline] pub fn status(&self) -> AgentStatus { self.status }
    #[inline] pub fn current_vertex(&self) -> VertexId { self.current_vertex }
    #[inline] pub fn target_vertex(&self) -> Option<VertexId> { self.target_vertex }
    #[inline] pub fn path(&self) -> &[VertexId] { &self.path }
    #[inline] pub fn path_cursor(&self) -> usize { self.path_cursor }
    #[inline] pub fn position(&self) -> Point { self.position }
    #[inline] pub fn edge_progress(&self) -> f64 { self.edge_progress }
    #[inline] pub fn blocked_by(&self) -> Option<AgentId> { self.blocked_by }
    #[inline] pub fn last_retry_time(&self) -> Option<SimTime> { self.last_retry_time }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.status == AgentStatus::Moving
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.status == AgentStatus::Blocked
    }

    /// `true` if a retry is due: never retried, or the last retry was at
    /// least `interval` ago.
    pub fn retry_due(&self, now: SimTime, interval: f64) -> bool {
        self.last_retry_time.is_none_or(|t| now.since(t) >= interval)
    }

    /// Owned copy for display and export.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot::from(self)
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Begin walking `path` (which must end at `target`) from
    /// `start_position`.
    ///
    /// An empty `path` is treated as `[target]`: the next `advance`
    /// completes the task in place.
    pub fn start(&mut self, target: VertexId, path: Vec<VertexId>, start_position: Point) {
        debug_assert!(path.last().is_none_or(|&v| v == target));
        self.path = if path.is_empty() { vec![target] } else { path };
        self.target_vertex = Some(target);
        self.path_cursor = 0;
        self.edge_progress = 0.0;
        self.position = start_position;
        self.blocked_by = None;
        self.status = AgentStatus::Moving;
    }

    /// One movement step of `dt` time units at `speed` edge fractions per
    /// unit.  `positions` resolves vertex ids to coordinates.
    ///
    /// Returns the crossing, if any.  At most one vertex is crossed per call;
    /// leftover progress past `1.0` is dropped.  A no-op unless MOVING.
    pub fn advance(
        &mut self,
        dt: f64,
        speed: f64,
        positions: impl Fn(VertexId) -> Option<Point>,
    ) -> Option<VertexTransition> {
        if self.status != AgentStatus::Moving {
            return None;
        }

        let last = self.path.len().saturating_sub(1);
        if self.path_cursor >= last {
            return Some(self.complete(&positions));
        }

        self.edge_progress += speed * dt;
        if self.edge_progress >= 1.0 {
            let left = self.current_vertex;
            self.path_cursor += 1;
            self.edge_progress = 0.0;
            self.current_vertex = self.path[self.path_cursor];
            if let Some(p) = positions(self.current_vertex) {
                self.position = p;
            }
            return Some(VertexTransition {
                agent:     self.id,
                left,
                reached:   self.current_vertex,
                completed: false,
            });
        }

        let from = positions(self.path[self.path_cursor]);
        let to = positions(self.path[self.path_cursor + 1]);
        if let (Some(from), Some(to)) = (from, to) {
            self.position = interpolate(from, to, self.edge_progress);
        }
        None
    }

    fn complete(&mut self, positions: &impl Fn(VertexId) -> Option<Point>) -> VertexTransition {
        let left = self.current_vertex;
        let target = self.target_vertex.or(self.path.last().copied()).unwrap_or(left);
        if let Some(p) = positions(target) {
            self.position = p;
        }
        self.current_vertex = target;
        self.clear_task();
        self.status = AgentStatus::TaskComplete;
        VertexTransition { agent: self.id, left, reached: target, completed: true }
    }

    /// Reservation denied by `holder`.  The target is kept so a retry has a
    /// destination.
    pub fn set_blocked(&mut self, holder: AgentId, target: VertexId) {
        self.path.clear();
        self.path_cursor = 0;
        self.edge_progress = 0.0;
        self.target_vertex = Some(target);
        self.blocked_by = Some(holder);
        self.status = AgentStatus::Blocked;
    }

    /// Drop the task and go IDLE wherever the agent currently is.
    pub fn cancel(&mut self) {
        self.clear_task();
        self.status = AgentStatus::Idle;
    }

    /// Record a retry attempt at `now`.
    pub fn note_retry(&mut self, now: SimTime) {
        self.last_retry_time = Some(now);
    }

    fn clear_task(&mut self) {
        self.path.clear();
        self.path_cursor = 0;
        self.edge_progress = 0.0;
        self.target_vertex = None;
        self.blocked_by = None;
    }
}
