//! `fleet-agent`: per-robot movement state for the fleet.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`agent`]    | `Agent` state machine, `VertexTransition`                    |
//! | [`motion`]   | `smooth_step`, edge interpolation                            |
//! | [`roster`]   | `AgentRoster` (`Vec<Agent>` indexed by `AgentId`)            |
//! | [`snapshot`] | `AgentSnapshot`, an owned copy for display and export        |
//!
//! # Movement model (tick interpolation)
//!
//! A granted path is walked one edge at a time:
//!
//! ```text
//! edge_progress += speed × dt
//! edge_progress ≥ 1  → cross onto the next vertex, progress = 0
//! on last vertex     → snap to target, TASK_COMPLETE
//! position           = lerp(path[c], path[c+1], smooth_step(progress))
//! ```
//!
//! Speed is measured in edge fractions per time unit, so every edge takes the
//! same time regardless of its length.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Agent` and `AgentSnapshot`. |

pub mod agent;
pub mod motion;
pub mod roster;
pub mod snapshot;


pub use agent::{Agent, VertexTransition};
pub use motion::{interpolate, smooth_step};
pub use roster::AgentRoster;
pub use snapshot::AgentSnapshot;
