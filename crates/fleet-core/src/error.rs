//! Core error type.
//!
//! Higher crates keep their own enums (`GraphError`, `FleetError`, …) and
//! wrap `CoreError` through a `#[from]` variant where it can surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fleet-core`.
pub type CoreResult<T> = Result<T, CoreError>;
