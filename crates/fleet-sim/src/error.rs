use thiserror::Error;

use fleet_core::{AgentId, AgentStatus, CoreError, VertexId};
use fleet_graph::GraphError;

/// Every way a fleet operation can fail.
///
/// Variants other than [`FleetError::Blocked`] leave the fleet untouched.
/// `Blocked` is reported after the agent has been marked BLOCKED.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("vertex {0} is not part of the graph")]
    UnknownVertex(VertexId),

    #[error("{agent} is {status} and cannot take a new task")]
    NotAssignable { agent: AgentId, status: AgentStatus },

    #[error("no path from {from} to {to}")]
    NoPath { from: VertexId, to: VertexId },

    #[error("{agent} is blocked by {holder}")]
    Blocked { agent: AgentId, holder: AgentId },

    #[error("{agent} is {status}; only moving or waiting agents can be cancelled")]
    NotCancellable { agent: AgentId, status: AgentStatus },

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("graph error: {0}")]
    Graph(GraphError),

    #[error("fleet runtime has stopped")]
    RuntimeStopped,

    #[error("no reply from the fleet runtime within {0:?}")]
    ReplyTimeout(std::time::Duration),
}

impl From<GraphError> for FleetError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::NoPath { from, to } => FleetError::NoPath { from, to },
            GraphError::UnknownVertex(v) => FleetError::UnknownVertex(v),
            other => FleetError::Graph(other),
        }
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
