//! Commands queued by [`FleetHandle`][crate::FleetHandle] and applied on the
//! simulation thread.
//!
//! Each command carries its own reply channel.  The runtime answers once the
//! command is applied; a caller that gave up waiting has dropped its
//! receiver, and the answer is discarded.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use fleet_core::{AgentId, SimTime, VertexId};
use fleet_graph::NavGraph;

use crate::{FleetError, FleetOrchestrator, FleetResult};

pub enum FleetCommand {
    Spawn    { vertex: VertexId,                   reply: Sender<FleetResult<AgentId>> },
    Assign   { agent: AgentId, target: VertexId,   reply: Sender<FleetResult<()>> },
    Cancel   { agent: AgentId,                     reply: Sender<FleetResult<()>> },
    Waiting  { vertex: VertexId,                   reply: Sender<FleetResult<Vec<AgentId>>> },
    AgentsAt { vertex: VertexId,                   reply: Sender<FleetResult<Vec<AgentId>>> },
}

impl FleetCommand {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            FleetCommand::Spawn { .. } => "spawn",
            FleetCommand::Assign { .. } => "assign",
            FleetCommand::Cancel { .. } => "cancel",
            FleetCommand::Waiting { .. } => "waiting",
            FleetCommand::AgentsAt { .. } => "agents_at",
        }
    }

    /// Apply to `fleet` at `now` and send the answer back.
    pub fn apply<G: NavGraph>(self, fleet: &mut FleetOrchestrator<G>, now: SimTime) {
        // A send error only means the caller stopped waiting.
        match self {
            FleetCommand::Spawn { vertex, reply } => {
                let _ = reply.send(fleet.spawn(vertex));
            }
            FleetCommand::Assign { agent, target, reply } => {
                let _ = reply.send(fleet.assign(agent, target, now));
            }
            FleetCommand::Cancel { agent, reply } => {
                let _ = reply.send(fleet.cancel(agent, now));
            }
            FleetCommand::Waiting { vertex, reply } => {
                let _ = reply.send(Ok(fleet.waiting(vertex)));
            }
            FleetCommand::AgentsAt { vertex, reply } => {
                let _ = reply.send(Ok(fleet.agents_at(vertex)));
            }
        }
    }
}

/// Reply to a queued command.  Waiting is always bounded.
#[must_use = "a pending reply does nothing unless waited on"]
pub struct Pending<T> {
    rx: Receiver<FleetResult<T>>,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: Receiver<FleetResult<T>>) -> Self {
        Self { rx }
    }

    /// Block for at most `timeout` waiting for the runtime's answer.
    pub fn wait(self, timeout: Duration) -> FleetResult<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(FleetError::ReplyTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(FleetError::RuntimeStopped),
        }
    }

    /// Non-blocking check.  `None` if the answer has not arrived yet.
    pub fn try_take(&self) -> Option<FleetResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(std::sync::mpsc::TryRecvError::Empty) => None,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => Some(Err(FleetError::RuntimeStopped)),
        }
    }
}
