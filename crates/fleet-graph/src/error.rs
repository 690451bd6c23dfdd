//! Graph-boundary error type.

use thiserror::Error;

use fleet_core::VertexId;

/// Errors produced by `fleet-graph`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    NoPath { from: VertexId, to: VertexId },

    #[error("vertex {0} not found in graph")]
    UnknownVertex(VertexId),

    #[error("vertex {0} added twice")]
    DuplicateVertex(VertexId),
}

pub type GraphResult<T> = Result<T, GraphError>;
