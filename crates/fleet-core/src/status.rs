//! Agent status vocabulary shared by the state machine, the orchestrator, and
//! output writers.

/// Exactly one of these holds for every agent at any time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentStatus {
    /// No task.  Initial state after spawn, and after a cancel.
    #[default]
    Idle,
    /// Traversing a granted path.
    Moving,
    /// Display-only state.  Nothing in the fleet transitions into it yet.
    Waiting,
    /// Last reservation attempt was denied; retried with backoff.
    Blocked,
    /// Reached the target.  Accepts a new assignment like `Idle`.
    TaskComplete,
}

impl AgentStatus {
    /// `true` for states that accept a fresh assignment.
    #[inline]
    pub fn is_assignable(self) -> bool {
        matches!(self, AgentStatus::Idle | AgentStatus::TaskComplete)
    }

    /// `true` for states that `cancel` acts on.
    #[inline]
    pub fn is_cancellable(self) -> bool {
        matches!(self, AgentStatus::Moving | AgentStatus::Waiting)
    }

    /// `true` for states in which the agent carries a target vertex.
    #[inline]
    pub fn has_target(self) -> bool {
        matches!(self, AgentStatus::Moving | AgentStatus::Blocked | AgentStatus::Waiting)
    }

    /// Label used in logs and CSV columns.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Idle         => "idle",
            AgentStatus::Moving       => "moving",
            AgentStatus::Waiting      => "waiting",
            AgentStatus::Blocked      => "blocked",
            AgentStatus::TaskComplete => "task_complete",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
